//! Target file discovery.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::PipelineError;

/// Include pattern used when none are configured.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] =
    &["**/*.{css,scss,sass,less,js,jsx,ts,tsx,mjs,cjs,mts,cts,html,htm,vue,svelte}"];

/// Build output and dependency directories, never walked.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    ".next",
    ".nuxt",
    ".svelte-kit",
    "out",
];

/// Exclude patterns applied on top of the configured ones.
pub const IMPLICIT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/.next/**",
    "**/.nuxt/**",
    "**/.svelte-kit/**",
    "**/out/**",
];

/// Exclude patterns used when none are configured: minified bundles.
/// Unlike the implicit ones, a configured exclude list replaces these.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["**/*.min.js", "**/*.min.css"];

/// Compile glob patterns into a set.
pub fn build_globset<I, S>(patterns: I) -> Result<GlobSet, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|source| PipelineError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| PipelineError::Glob {
        pattern: "<set>".to_string(),
        source,
    })
}

/// Expand include patterns under `root`, minus excludes.
///
/// Paths come back in sorted walk order without duplicates (symlinked
/// copies of the same file are reported once). A `root` that is a file is
/// returned as-is. Failure to access the root is fatal; unreadable entries
/// further down are logged and skipped.
pub fn discover(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<PathBuf>, PipelineError> {
    let metadata = std::fs::metadata(root).map_err(|source| PipelineError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if metadata.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let include_set = if include.is_empty() {
        build_globset(DEFAULT_INCLUDE_PATTERNS)?
    } else {
        build_globset(include)?
    };
    let exclude_set = build_globset(
        exclude
            .iter()
            .map(String::as_str)
            .chain(IMPLICIT_EXCLUDE_PATTERNS.iter().copied()),
    )?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(PipelineError::Walk {
                    path: root.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry during discovery");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(root, entry.path());
        if !include_set.is_match(&rel) || exclude_set.is_match(&rel) {
            continue;
        }

        let path = entry.into_path();
        let identity = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(identity) {
            files.push(path);
        }
    }

    tracing::debug!(root = %root.display(), count = files.len(), "discovered files");
    Ok(files)
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| DEFAULT_EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// `path` relative to `root` with forward slashes.
///
/// A path equal to `root` (single-file scan) yields its file name.
pub fn relative_path(root: &Path, path: &Path) -> String {
    if path == root {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
    }
    path.strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}
