//! Output formatting for baselinecheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - Markdown: tables suitable for pull request comments

use colored::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    AnalysisResult, FailOn, FeatureUsage, FileTypeBreakdown, RiskDistribution, Summary,
};
use crate::baseline::{BaselineStatus, RiskLevel};
use crate::detect::FeatureKind;
use crate::pipeline::{DetectedFeature, ErrorRecord};

/// Locations listed per usage before the rest are elided.
const MAX_LOCATIONS_SHOWN: usize = 3;

/// Run metadata shown alongside the result.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub path: String,
    pub config: Option<String>,
    pub fail_on: FailOn,
    pub support_threshold: u32,
}

impl ReportContext {
    fn config_label(&self) -> &str {
        self.config.as_deref().unwrap_or("(defaults)")
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub fail_on: FailOn,
    pub passed: bool,
    pub support_score: u8,
    pub support_threshold: u32,
    pub meets_support_threshold: bool,
    pub total_files: usize,
    pub analyzed_files: usize,
    pub summary: Summary,
    pub risk_distribution: RiskDistribution,
    pub file_type_breakdown: FileTypeBreakdown,
    pub usages: Vec<FeatureUsage>,
    pub features: Vec<DetectedFeature>,
    pub errors: Vec<ErrorRecord>,
}

impl JsonReport {
    pub fn new(ctx: &ReportContext, result: &AnalysisResult) -> Self {
        let support_score = result.support_score();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: ctx.path.clone(),
            config: ctx.config.clone(),
            fail_on: ctx.fail_on,
            passed: !result.fails_at(ctx.fail_on),
            support_score,
            support_threshold: ctx.support_threshold,
            meets_support_threshold: u32::from(support_score) >= ctx.support_threshold,
            total_files: result.total_files,
            analyzed_files: result.analyzed_files,
            summary: result.summary,
            risk_distribution: result.risk_distribution,
            file_type_breakdown: result.file_type_breakdown,
            usages: result.usages(),
            features: result.features.clone(),
            errors: result.errors.clone(),
        }
    }
}

/// Render results as pretty-printed JSON.
pub fn render_json(ctx: &ReportContext, result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(ctx, result))?)
}

/// Write results in JSON format.
pub fn write_json(ctx: &ReportContext, result: &AnalysisResult) -> anyhow::Result<()> {
    println!("{}", render_json(ctx, result)?);
    Ok(())
}

// =============================================================================
// Markdown Format
// =============================================================================

/// Render results as a Markdown document.
pub fn render_markdown(ctx: &ReportContext, result: &AnalysisResult) -> String {
    let passed = !result.fails_at(ctx.fail_on);
    let mut lines = vec![
        "## Baseline compatibility report".to_string(),
        String::new(),
        format!(
            "**{}** (fail on: `{}`) · support score **{}%** (target {}%) · {} of {} files analyzed",
            if passed { "PASS" } else { "FAIL" },
            ctx.fail_on,
            result.support_score(),
            ctx.support_threshold,
            result.analyzed_files,
            result.total_files
        ),
        String::new(),
        "| Status | Risk | Count |".to_string(),
        "|---|---|---:|".to_string(),
    ];
    for status in BaselineStatus::ALL {
        lines.push(format!(
            "| {} | {} | {} |",
            status.label(),
            status.risk(),
            result.summary.get(status)
        ));
    }
    lines.push(String::new());

    let usages: Vec<FeatureUsage> = result
        .usages()
        .into_iter()
        .filter(|u| u.risk > RiskLevel::Low)
        .collect();
    if !usages.is_empty() {
        lines.push("### Features needing attention".to_string());
        lines.push(String::new());
        lines.push("| Feature | Kind | Status | Uses | Locations |".to_string());
        lines.push("|---|---|---|---:|---|".to_string());
        lines.extend(usages.iter().map(|u| {
            format!(
                "| `{}` | {} | {} | {} | {} |",
                u.feature_key,
                u.kind,
                u.baseline_status.label(),
                u.count,
                format_locations(u)
            )
        }));
        lines.push(String::new());
    }

    if !result.errors.is_empty() {
        lines.push("### Files not analyzed".to_string());
        lines.push(String::new());
        lines.extend(
            result
                .errors
                .iter()
                .map(|e| format!("- `{}`: {}", e.file, e.message)),
        );
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write results in Markdown format.
pub fn write_markdown(ctx: &ReportContext, result: &AnalysisResult) {
    print!("{}", render_markdown(ctx, result));
}

fn format_locations(usage: &FeatureUsage) -> String {
    let mut shown: Vec<String> = usage
        .locations
        .iter()
        .take(MAX_LOCATIONS_SHOWN)
        .map(|l| format!("{}:{}", l.file, l.line))
        .collect();
    if usage.locations.len() > MAX_LOCATIONS_SHOWN {
        shown.push(format!(
            "+{} more",
            usage.locations.len() - MAX_LOCATIONS_SHOWN
        ));
    }
    shown.join(", ")
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(ctx: &ReportContext, result: &AnalysisResult) {
    // Header
    println!();
    print!("  ");
    print!("{}", "baselinecheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", ctx.path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", ctx.config_label());
    println!();

    write_result_summary(ctx, result);
    println!();

    let usages: Vec<FeatureUsage> = result
        .usages()
        .into_iter()
        .filter(|u| u.risk > RiskLevel::Low)
        .collect();
    if !usages.is_empty() {
        write_usages(&usages);
        println!();
    }

    if !result.errors.is_empty() {
        write_errors(&result.errors);
        println!();
    }

    write_breakdown(result);
    println!();

    write_final_status(ctx, result);
    println!();
}

fn write_result_summary(ctx: &ReportContext, result: &AnalysisResult) {
    if result.fails_at(ctx.fail_on) {
        print!("  {}", "✗ FAIL".red());
    } else {
        print!("  {}", "✓ PASS".green());
    }

    print!("  Support score: ");
    write_colored_score(result.support_score(), ctx.support_threshold);
    print!("%");
    print!(
        "  {}",
        format!(
            "({} of {} files analyzed)",
            result.analyzed_files, result.total_files
        )
        .dimmed()
    );
    println!();
}

fn write_colored_score(score: u8, threshold: u32) {
    let s = score.to_string();
    if u32::from(score) >= threshold {
        print!("{}", s.green().bold());
    } else if u32::from(score) + 10 >= threshold {
        print!("{}", s.yellow());
    } else {
        print!("{}", s.red());
    }
}

fn write_usages(usages: &[FeatureUsage]) {
    println!("  {} ({}):", "Features needing attention".bold(), usages.len());
    println!();

    for u in usages {
        write_risk_tag(u.risk);
        print!("   ");
        print!("{:<12}", u.kind.as_str().dimmed());
        print!("{}", u.feature_key.blue());
        let plural = if u.count != 1 { "s" } else { "" };
        println!("{}", format!("  {} use{}", u.count, plural).dimmed());

        println!(
            "            {}  {}",
            u.baseline_status.label(),
            format_locations(u).dimmed()
        );
        println!();
    }
}

fn write_risk_tag(risk: RiskLevel) {
    match risk {
        RiskLevel::High => print!("    {} ", "HIGH".red()),
        RiskLevel::Medium => print!("    {} ", "MED ".yellow()),
        RiskLevel::Low => print!("    {} ", "LOW ".green()),
    }
}

fn write_errors(errors: &[ErrorRecord]) {
    println!("  {} ({}):", "Files not analyzed".yellow(), errors.len());
    for e in errors {
        print!("    {}", e.file.blue());
        println!("  {}", e.message.dimmed());
    }
}

fn write_breakdown(result: &AnalysisResult) {
    println!("  {}", "Breakdown:".bold());
    for status in BaselineStatus::ALL {
        println!(
            "    {:<24} {:>5}",
            status.label(),
            result.summary.get(status)
        );
    }
    let kinds: Vec<String> = FeatureKind::ALL
        .iter()
        .map(|&kind| format!("{} {}", kind, result.file_type_breakdown.get(kind)))
        .collect();
    println!("    {}", kinds.join("  ").dimmed());
}

fn write_final_status(ctx: &ReportContext, result: &AnalysisResult) {
    print!("  {}", format!("Fail on: {}", ctx.fail_on).dimmed());
    let risk = &result.risk_distribution;
    print!(
        "  Risk: {} high, {} medium, {} low  ",
        risk.high, risk.medium, risk.low
    );

    if result.fails_at(ctx.fail_on) {
        print!("{}", "FAILED".red());
    } else {
        print!("{}", "PASSED".green());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::assemble;
    use crate::pipeline::{FileOutcome, FileReport};

    fn sample() -> AnalysisResult {
        let feature = |key: &str, status, line| DetectedFeature {
            name: key.rsplit('.').next().unwrap().to_string(),
            kind: FeatureKind::Css,
            line,
            column: 2,
            file_path: "src/app.css".to_string(),
            baseline_status: status,
            context: None,
            feature_key: key.to_string(),
        };
        assemble(vec![
            FileReport {
                file: "src/app.css".to_string(),
                outcome: FileOutcome::Analyzed {
                    kind: FeatureKind::Css,
                    features: vec![
                        feature("css.properties.gap", BaselineStatus::WidelyAvailable, 1),
                        feature(
                            "css.properties.text-wrap",
                            BaselineStatus::LimitedAvailability,
                            2,
                        ),
                    ],
                },
            },
            FileReport {
                file: "locked.js".to_string(),
                outcome: FileOutcome::Failed("Permission denied".to_string()),
            },
        ])
    }

    fn ctx() -> ReportContext {
        ReportContext {
            path: ".".to_string(),
            config: None,
            fail_on: FailOn::High,
            support_threshold: 90,
        }
    }

    #[test]
    fn test_json_report_fields() {
        let json = render_json(&ctx(), &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["passed"], false);
        assert_eq!(value["supportScore"], 50);
        assert_eq!(value["meetsSupportThreshold"], false);
        assert_eq!(value["failOn"], "high");
        assert_eq!(value["summary"]["limitedAvailability"], 1);
        assert_eq!(value["riskDistribution"]["high"], 1);
        assert_eq!(value["usages"][0]["featureKey"], "css.properties.text-wrap");
        assert_eq!(value["features"][1]["baselineStatus"], "limited_availability");
        assert_eq!(value["errors"][0]["file"], "locked.js");
        assert!(value.get("config").is_none());
    }

    #[test]
    fn test_markdown_report() {
        let md = render_markdown(&ctx(), &sample());
        assert!(md.contains("**FAIL**"));
        assert!(md.contains("| Widely available | low | 1 |"));
        assert!(md.contains("| Newly available | medium | 0 |"));
        assert!(md.contains("| Limited availability | high | 1 |"));
        assert!(md.ends_with("Permission denied\n\n"));
        assert!(md.contains("`css.properties.text-wrap`"));
        assert!(!md.contains("`css.properties.gap`"));
        assert!(md.contains("- `locked.js`: Permission denied"));
    }

    #[test]
    fn test_location_elision() {
        let usage = FeatureUsage {
            feature_key: "k".to_string(),
            name: "k".to_string(),
            kind: FeatureKind::Css,
            baseline_status: BaselineStatus::LimitedAvailability,
            risk: RiskLevel::High,
            count: 5,
            locations: (1..=5)
                .map(|line| crate::aggregate::Location {
                    file: "a.css".to_string(),
                    line,
                    column: 0,
                })
                .collect(),
        };
        assert_eq!(
            format_locations(&usage),
            "a.css:1, a.css:2, a.css:3, +2 more"
        );
    }
}
