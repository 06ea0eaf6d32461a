//! Output formatters for scored solicitations

use crate::config::OutputFormat;
use crate::error::{Result, RfpAlignerError};
use crate::output::report::*;
use crate::processing::explain::NaicsMatch;
use crate::processing::scoring::ReadinessLevel;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

const PREVIEW_GRAPHEMES: usize = 90;

pub trait OutputFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors and detail sections
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that dispatches to the formatter for each format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>RFP Match Report: {{ title }}</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            border-bottom: 3px solid #1f4e79;
            padding-bottom: 20px;
        }
        .readiness {
            display: inline-block;
            padding: 8px 16px;
            border-radius: 20px;
            font-weight: bold;
            color: white;
            margin-left: 10px;
        }
        .readiness-high { background: #28a745; }
        .readiness-medium { background: #ffc107; color: #000; }
        .readiness-low { background: #dc3545; }
        .section { margin: 25px 0; }
        .section h2 {
            color: #1f4e79;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        table { border-collapse: collapse; width: 100%; }
        th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e9ecef; }
        .matched { color: #28a745; }
        .missing { color: #dc3545; }
        .metadata {
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{{ title }}</h1>
            {% if !agency.is_empty() %}<p>{{ agency }}{% if !solicitation_number.is_empty() %} | {{ solicitation_number }}{% endif %}</p>{% endif %}
            <p><strong>Overall match: {{ overall_score }}%</strong>
                <span class="readiness readiness-{{ readiness_class }}">{{ readiness }}</span></p>
            <p>{{ verdict }}</p>
        </div>

        <div class="section">
            <h2>Score Breakdown</h2>
            <table>
                <tr><th>Signal</th><th>Score</th><th>Weight</th></tr>
                {% for component in components %}
                <tr><td>{{ component.name }}</td><td>{{ component.score }}%</td><td>{{ component.weight_percent }}%</td></tr>
                {% endfor %}
            </table>
        </div>

        <div class="section">
            <h2>Requirements</h2>
            <p><strong>NAICS:</strong> {{ naics_note }}</p>
            {% if !matched_certifications.is_empty() %}
            <h3>Certifications held</h3>
            <ul>{% for item in matched_certifications %}<li class="matched">{{ item }}</li>{% endfor %}</ul>
            {% endif %}
            {% if !missing_certifications.is_empty() %}
            <h3>Certifications missing</h3>
            <ul>{% for item in missing_certifications %}<li class="missing">{{ item }}</li>{% endfor %}</ul>
            {% endif %}
            {% if !unmatched_requirements.is_empty() %}
            <h3>Uncovered technical requirements</h3>
            <ul>{% for item in unmatched_requirements %}<li>{{ item }}</li>{% endfor %}</ul>
            {% endif %}
        </div>

        {% if !strengths.is_empty() || !gaps.is_empty() %}
        <div class="section">
            <h2>Match Analysis</h2>
            {% if !strengths.is_empty() %}
            <h3>Strengths</h3>
            <ul>{% for item in strengths %}<li>{{ item }}</li>{% endfor %}</ul>
            {% endif %}
            {% if !gaps.is_empty() %}
            <h3>Gaps</h3>
            <ul>{% for item in gaps %}<li>{{ item }}</li>{% endfor %}</ul>
            {% endif %}
        </div>
        {% endif %}

        {% if !partners.is_empty() %}
        <div class="section">
            <h2>Teaming Partners</h2>
            <ul>{% for item in partners %}<li>{{ item }}</li>{% endfor %}</ul>
        </div>
        {% endif %}

        <div class="metadata">
            <p>Generated {{ generated_at }} by RFP Aligner v{{ version }}</p>
            {% if !record_id.is_empty() %}<p>Record: {{ record_id }}</p>{% endif %}
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    title: String,
    agency: String,
    solicitation_number: String,
    overall_score: u8,
    readiness: String,
    readiness_class: String,
    verdict: String,
    components: Vec<ScoreComponent>,
    naics_note: String,
    matched_certifications: Vec<String>,
    missing_certifications: Vec<String>,
    unmatched_requirements: Vec<String>,
    strengths: Vec<String>,
    gaps: Vec<String>,
    partners: Vec<String>,
    generated_at: String,
    version: String,
    record_id: String,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_readiness_badge(&self, level: ReadinessLevel) -> String {
        let color = match level {
            ReadinessLevel::High => Color::Green,
            ReadinessLevel::Medium => Color::Yellow,
            ReadinessLevel::Low => Color::Red,
        };
        let badge = format!("[{} READINESS]", level.to_string().to_uppercase());

        if self.use_colors {
            badge.color(color).bold().to_string()
        } else {
            badge
        }
    }

    fn push_list(&self, output: &mut String, title: &str, items: &[String], color: Color) {
        if items.is_empty() {
            return;
        }
        output.push_str(&self.format_header(title, 3));
        for item in items {
            output.push_str(&format!("  • {}\n", self.colorize(&preview(item, PREVIEW_GRAPHEMES), color)));
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;
        let explanation = &report.explanation;

        output.push_str(&self.format_header(&format!("RFP MATCH: {}", summary.title), 1));
        let mut facts = Vec::new();
        if let Some(agency) = &summary.agency {
            facts.push(format!("Agency: {}", agency));
        }
        if let Some(number) = &summary.solicitation_number {
            facts.push(format!("Solicitation: {}", number));
        }
        if let Some(due) = &summary.due_date {
            facts.push(format!("Due: {}", due));
        }
        if let Some(set_aside) = &summary.set_aside {
            facts.push(format!("Set-aside: {}", set_aside));
        }
        if !facts.is_empty() {
            output.push_str(&format!("{}\n", facts.join(" | ")));
        }

        output.push_str(&format!(
            "\nOverall Match: {}% {}\n",
            summary.overall_match_score,
            self.format_readiness_badge(summary.readiness_level)
        ));
        output.push_str(&format!("Verdict: {}\n", self.colorize(&summary.verdict, Color::Cyan)));

        output.push_str(&self.format_header("Score Breakdown", 2));
        for component in &report.score_breakdown {
            output.push_str(&format!(
                "  {:<18} {:>3}%  (weight {}%)\n",
                component.name, component.score, component.weight_percent
            ));
        }
        output.push_str(&format!("  {:<18} +10   (baseline)\n", ""));

        output.push_str(&self.format_header("Requirements", 2));
        output.push_str(&format!("NAICS: {}\n", naics_note(report)));
        self.push_list(&mut output, "Certifications held", &explanation.matched_certifications, Color::Green);
        self.push_list(&mut output, "Certifications missing", &explanation.missing_certifications, Color::Red);
        for hint in &explanation.near_misses {
            output.push_str(&format!(
                "    {} '{}' looks like held '{}'\n",
                self.colorize("hint:", Color::BrightBlack),
                hint.required,
                hint.held
            ));
        }

        let analysis = &report.match_analysis;
        self.push_list(&mut output, "Strengths", &analysis.strengths, Color::Green);
        self.push_list(&mut output, "Gaps", &analysis.gaps, Color::Yellow);
        self.push_list(&mut output, "Risk flags", &analysis.risk_flags, Color::Red);

        if !report.partner_recommendations.is_empty() {
            output.push_str(&self.format_header("Teaming Partners", 2));
            for partner in &report.partner_recommendations {
                match &partner.rationale {
                    Some(rationale) => output.push_str(&format!(
                        "  • {} {}\n",
                        self.colorize(&partner.name, Color::White),
                        self.colorize(&format!("({})", preview(rationale, PREVIEW_GRAPHEMES)), Color::BrightBlack)
                    )),
                    None => output.push_str(&format!("  • {}\n", partner.name)),
                }
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Detailed Analysis", 2));
            self.push_list(&mut output, "Covered technical requirements", &explanation.matched_requirements, Color::Green);
            self.push_list(&mut output, "Uncovered technical requirements", &explanation.unmatched_requirements, Color::Yellow);
            if explanation.past_performance_hits.is_empty() {
                output.push_str("\nPast performance: no tag found in experience requirements\n");
            } else {
                output.push_str(&format!(
                    "\nPast performance hits: {}\n",
                    explanation.past_performance_hits.join(", ")
                ));
            }
            if let Some(chars) = report.metadata.text_chars {
                output.push_str(&format!("Solicitation text: {} characters\n", chars));
            }
        }

        let mut footer = format!(
            "\n{} Generated {} by RFP Aligner v{}",
            self.colorize("ℹ", Color::Blue),
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.aligner_version
        );
        if let Some(id) = &report.metadata.record_id {
            footer.push_str(&format!(" | Record: {}", id));
        }
        if let Some(ms) = report.metadata.processing_time_ms {
            footer.push_str(&format!(" | {}ms", ms));
        }
        output.push_str(&footer);
        output.push('\n');

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn push_list(output: &mut String, title: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        output.push_str(&format!("### {}\n\n", title));
        for item in items {
            output.push_str(&format!("- {}\n", item));
        }
        output.push('\n');
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;
        let explanation = &report.explanation;

        output.push_str(&format!("# RFP Match Report: {}\n\n", summary.title));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {}",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if let Some(id) = &report.metadata.record_id {
                output.push_str(&format!(" | **Record:** `{}`", id));
            }
            if let Some(source) = &report.metadata.source {
                let name = Path::new(source)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| source.clone());
                output.push_str(&format!(" | **Source:** `{}`", name));
            }
            output.push_str("\n\n");
        }

        output.push_str("## Summary\n\n");
        if let Some(agency) = &summary.agency {
            output.push_str(&format!("**Agency:** {}\n\n", agency));
        }
        if let Some(number) = &summary.solicitation_number {
            output.push_str(&format!("**Solicitation:** {}\n\n", number));
        }
        if let Some(due) = &summary.due_date {
            output.push_str(&format!("**Due:** {}\n\n", due));
        }
        output.push_str(&format!(
            "**Overall Match Score:** {}% ({} readiness)\n\n",
            summary.overall_match_score, summary.readiness_level
        ));
        output.push_str(&format!("**Verdict:** {}\n\n", summary.verdict));

        output.push_str("### Score Breakdown\n\n");
        output.push_str("| Signal | Score | Weight |\n");
        output.push_str("|--------|-------|--------|\n");
        for component in &report.score_breakdown {
            output.push_str(&format!(
                "| {} | {}% | {}% |\n",
                component.name, component.score, component.weight_percent
            ));
        }
        output.push_str("| Baseline | +10 | |\n\n");

        output.push_str("## Requirements\n\n");
        output.push_str(&format!("**NAICS:** {}\n\n", naics_note(report)));
        Self::push_list(&mut output, "Certifications held", &explanation.matched_certifications);
        Self::push_list(&mut output, "Certifications missing", &explanation.missing_certifications);
        Self::push_list(&mut output, "Uncovered technical requirements", &explanation.unmatched_requirements);

        let analysis = &report.match_analysis;
        if !analysis.strengths.is_empty() || !analysis.gaps.is_empty() || !analysis.risk_flags.is_empty() {
            output.push_str("## Match Analysis\n\n");
            Self::push_list(&mut output, "Strengths", &analysis.strengths);
            Self::push_list(&mut output, "Gaps", &analysis.gaps);
            Self::push_list(&mut output, "Risk Flags", &analysis.risk_flags);
        }

        if !report.partner_recommendations.is_empty() {
            output.push_str("## Teaming Partners\n\n");
            for partner in &report.partner_recommendations {
                match &partner.rationale {
                    Some(rationale) => output.push_str(&format!("- **{}**: {}\n", partner.name, rationale)),
                    None => output.push_str(&format!("- **{}**\n", partner.name)),
                }
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!("*Generated by RFP Aligner v{}*\n", report.metadata.aligner_version));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &ScoreReport) -> HtmlTemplate {
        let summary = &report.summary;
        let explanation = &report.explanation;

        HtmlTemplate {
            include_styles: self.include_styles,
            title: summary.title.clone(),
            agency: summary.agency.clone().unwrap_or_default(),
            solicitation_number: summary.solicitation_number.clone().unwrap_or_default(),
            overall_score: summary.overall_match_score,
            readiness: summary.readiness_level.to_string(),
            readiness_class: summary.readiness_level.to_string().to_lowercase(),
            verdict: summary.verdict.clone(),
            components: report.score_breakdown.clone(),
            naics_note: naics_note(report),
            matched_certifications: explanation.matched_certifications.clone(),
            missing_certifications: explanation.missing_certifications.clone(),
            unmatched_requirements: explanation.unmatched_requirements.clone(),
            strengths: report.match_analysis.strengths.clone(),
            gaps: report.match_analysis.gaps.clone(),
            partners: report
                .partner_recommendations
                .iter()
                .map(|p| match &p.rationale {
                    Some(rationale) => format!("{}: {}", p.name, rationale),
                    None => p.name.clone(),
                })
                .collect(),
            generated_at: report
                .metadata
                .generated_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            version: report.metadata.aligner_version.clone(),
            record_id: report.metadata.record_id.clone().unwrap_or_default(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| RfpAlignerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
        include_html_styles: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
        }
    }

    pub fn generate_report(&self, report: &ScoreReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn naics_note(report: &ScoreReport) -> String {
    let explanation = &report.explanation;
    match (explanation.naics_match, &explanation.matched_naics) {
        (NaicsMatch::NoConstraint, _) => "no NAICS constraint in the solicitation".to_string(),
        (NaicsMatch::Primary, Some(code)) => format!("primary code {} matches", code),
        (NaicsMatch::Secondary, Some(code)) => format!("secondary code {} matches", code),
        (NaicsMatch::Primary, None) | (NaicsMatch::Secondary, None) => "matched".to_string(),
        (NaicsMatch::None, _) => format!(
            "no company code among {}",
            report.summary.naics_codes.join(", ")
        ),
    }
}

/// Shorten `text` to at most `max_graphemes` user-perceived characters
pub fn preview(text: &str, max_graphemes: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_graphemes {
        text.to_string()
    } else {
        format!("{}...", graphemes[..max_graphemes].concat())
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, source_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(source_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "rfp".to_string());

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_match{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_match{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_match{}.md", base_name, timestamp_suffix),
        OutputFormat::Html => format!("{}_match{}.html", base_name, timestamp_suffix),
    }
}
