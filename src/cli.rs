//! Command-line interface for baselinecheck.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::baseline::Classifier;
use crate::compat::{Browser, CompatAdapter};
use crate::config::{self, Config, CONFIG_FILE_NAMES};
use crate::pipeline::Runner;
use crate::report::{self, ReportContext};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Output formats accepted by `--format`.
const FORMATS: &[&str] = &["pretty", "json", "markdown"];

/// Web platform baseline compatibility checker.
///
/// Scans CSS, JavaScript and HTML sources for web platform features and
/// classifies each one by how broadly browsers support it: widely
/// available, newly available, or limited availability. The result can
/// gate a build on the riskiest tier found.
#[derive(Parser)]
#[command(name = "baselinecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a project for web features and report their baseline status
    #[command(visible_alias = "scan")]
    Check(CheckArgs),
    /// Create a new baselinecheck config from a template
    Init(InitArgs),
    /// Show knowledge-base support data for feature keys
    Lookup(LookupArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or markdown
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Lowest risk level that fails the run: high, medium, or low
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Per-file size limit in bytes
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Per-file analysis timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Suppress the report; only the exit code is meaningful
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "baselinecheck.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for the lookup command.
#[derive(Parser)]
pub struct LookupArgs {
    /// Dotted feature keys, e.g. css.properties.gap
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Fail only on limited-availability features",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Fail on anything newer than widely available",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Load the config, reporting problems on stderr.
fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), i32> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Config::load(explicit, &cwd).map_err(|e| {
        eprintln!("Error: {}", e);
        EXIT_ERROR
    })
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    // Validate format
    if !FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be one of: {}",
            args.format,
            FORMATS.join(", ")
        );
        return Ok(EXIT_ERROR);
    }

    let (mut config, config_path) = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code),
    };

    // Flags override the file
    if let Some(fail_on) = &args.fail_on {
        config.fail_on = fail_on.clone();
    }
    if let Some(size) = args.max_file_size {
        config.max_file_size = size;
    }
    if let Some(timeout) = args.timeout {
        config.analysis_timeout = timeout;
    }
    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }
    let fail_on = config.fail_on_level()?;

    let kb = config.knowledge_base()?;
    let runner = Runner::new(&args.path, &kb).options(config.run_options());

    let show_progress = args.format == "pretty" && !args.quiet;
    let result = if show_progress {
        let bar = progress_bar();
        let result = runner.run_with_progress(|percent, message| {
            bar.set_position(u64::from(percent));
            bar.set_message(message.to_string());
        });
        bar.finish_and_clear();
        result?
    } else {
        runner.run()?
    };

    if result.total_files == 0 {
        eprintln!("Warning: no files to scan");
    }

    let ctx = ReportContext {
        path: args.path.to_string_lossy().to_string(),
        config: config_path.map(|p| p.to_string_lossy().to_string()),
        fail_on,
        support_threshold: config.support_threshold,
    };

    if !args.quiet {
        match args.format.as_str() {
            "json" => report::write_json(&ctx, &result)?,
            "markdown" => report::write_markdown(&ctx, &result),
            _ => report::write_pretty(&ctx, &result),
        }
    }

    // Return appropriate exit code
    if result.fails_at(fail_on) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Run the lookup command.
pub fn run_lookup(args: &LookupArgs) -> anyhow::Result<i32> {
    let (config, _) = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code),
    };
    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let kb = config.knowledge_base()?;
    let adapter = CompatAdapter::new(&kb);
    let classifier = Classifier::new(config.baseline_thresholds);
    let mut missing = 0;

    for key in &args.keys {
        let Some(fact) = adapter.resolve(key) else {
            println!("{}: not found", key);
            missing += 1;
            continue;
        };
        let status = classifier.classify(Some(&fact));
        let counts = classifier.counts(&fact);
        println!(
            "{}: {} ({} browsers, {} recent)",
            key,
            status.label(),
            counts.supported,
            counts.recent
        );
        for browser in Browser::ALL {
            println!("  {:<8} {}", browser.as_str(), fact.support(browser));
        }
    }

    if missing == args.keys.len() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // List mode
    if args.list {
        return list_templates();
    }

    // Find template
    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'baselinecheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    if CONFIG_FILE_NAMES.iter().any(|n| args.output == Path::new(n)) {
        println!("  2. Run: baselinecheck check .");
    } else {
        println!("  2. Run: baselinecheck check . --config {}", args.output.display());
    }

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  baselinecheck init --template <name>");

    Ok(EXIT_SUCCESS)
}
