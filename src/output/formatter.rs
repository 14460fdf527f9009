use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;
use terminal_size::{terminal_size, Width};

use crate::diagnostics::Diagnostics;
use crate::records::Bucket;
use crate::scoring::{GcsReport, SequenceScore};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a percentage with a fixed number of decimals ("75.00%").
/// Absent scores print as "n/a"; they are never shown as 0.
pub fn format_percent(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals, v),
        None => "n/a".to_string(),
    }
}

/// Format the headline scores, one bucket per line
pub fn format_summary(report: &GcsReport, decimals: usize, use_colors: bool) -> String {
    let mut lines = Vec::new();

    if let Some(ref model) = report.model_name {
        if use_colors {
            lines.push(format!("Model: {}", model.cyan()));
        } else {
            lines.push(format!("Model: {}", model));
        }
    }

    for bucket in Bucket::ALL {
        let label = format!("{} GCS:", bucket.name());
        let value = format_percent(report.rollup.bucket(bucket), decimals);
        let count = report.rollup.counts.get(bucket);
        lines.push(summary_line(&label, &value, Some(count), use_colors));
    }
    lines.push(summary_line(
        "Overall GCS:",
        &format_percent(report.rollup.overall_gcs, decimals),
        None,
        use_colors,
    ));
    lines.push(summary_line(
        "Combined GCS:",
        &format_percent(report.combined_gcs, decimals),
        None,
        use_colors,
    ));

    lines.join("\n")
}

fn summary_line(label: &str, value: &str, sequences: Option<usize>, use_colors: bool) -> String {
    let value_padded = format!("{:>8}", value);
    let suffix = sequences
        .map(|n| format!("  ({} sequences)", n))
        .unwrap_or_default();
    if use_colors {
        format!("  {:<17} {}{}", label, value_padded.bold(), suffix.dimmed())
    } else {
        format!("  {:<17} {}{}", label, value_padded, suffix)
    }
}

/// Format the report as one tab-separated line for scripting
/// Columns: model, objects, attributes, relations, overall, combined (no headers)
pub fn format_tsv(report: &GcsReport, decimals: usize) -> String {
    let cell = |v: Option<f64>| match v {
        Some(v) => format!("{:.*}", decimals, v),
        None => String::new(),
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        report.model_name.as_deref().unwrap_or(""),
        cell(report.rollup.objects_gcs),
        cell(report.rollup.attributes_gcs),
        cell(report.rollup.relations_gcs),
        cell(report.rollup.overall_gcs),
        cell(report.combined_gcs),
    )
}

/// Pretty JSON, full precision
pub fn format_json(report: &GcsReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format per-sequence scores: score, wrong/total, sequence key
/// Score column is right-aligned, 8 chars wide (fits "100.00%")
pub fn format_breakdown(scores: &[SequenceScore], decimals: usize, use_colors: bool) -> String {
    if scores.is_empty() {
        return "No sequences scored.".to_string();
    }

    let term_width = get_terminal_width();
    let score_width = 8;
    let counts_width = 7;
    let separator = "  ";

    scores
        .iter()
        .map(|scored| {
            let score_str = format!(
                "{:>width$}",
                format_percent(Some(scored.score * 100.0), decimals),
                width = score_width
            );
            let counts_str = format!(
                "{:>width$}",
                format!("{}/{}", scored.num_incorrect, scored.total_questions),
                width = counts_width
            );

            let fixed_width = score_width + counts_width + separator.len() * 2;
            let key = scored.key.to_string();
            let key = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_label(&key, width - fixed_width)
                }
                Some(_) => truncate_label(&key, 20),
                None => key,
            };

            if use_colors {
                let score_colored = if scored.num_incorrect == 0 {
                    score_str.green().to_string()
                } else if scored.num_incorrect == scored.total_questions {
                    score_str.red().to_string()
                } else {
                    score_str.yellow().to_string()
                };
                format!(
                    "{}{}{}{}{}",
                    score_colored,
                    separator,
                    counts_str.dimmed(),
                    separator,
                    key
                )
            } else {
                format!("{}{}{}{}{}", score_str, separator, counts_str, separator, key)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line tally of recoverable problems in `source`, empty when there are
/// none
pub fn format_diagnostics_summary(source: &Path, diagnostics: &Diagnostics) -> String {
    let counts = diagnostics.counts();
    let parts: Vec<String> = [
        (counts.malformed, "malformed"),
        (counts.duplicate_order, "duplicate"),
        (counts.unmappable_prediction, "unmappable"),
        (counts.label_mismatch, "label mismatch"),
        (counts.order_gap, "order gap"),
        (counts.empty_bucket, "empty bucket"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, what)| format!("{} {}", n, what))
    .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("{}: diagnostics: {}", source.display(), parts.join(", "))
    }
}

/// A model's report with the name it is listed under
pub struct ScoredModel<'a> {
    pub name: &'a str,
    pub report: &'a GcsReport,
}

/// Format models as a ranked table with columns: Index, Overall, buckets, Name
/// No headers (minimal format). Index column: 3 chars, right-aligned.
pub fn format_ranking(models: &[ScoredModel], decimals: usize, use_colors: bool) -> String {
    if models.is_empty() {
        return "No prediction files scored.".to_string();
    }

    let width = decimals + 5;
    models
        .iter()
        .enumerate()
        .map(|(idx, model)| {
            let index_str = format!("{:>2}.", idx + 1);
            let cell = |v: Option<f64>| format!("{:>w$}", format_percent(v, decimals), w = width);
            let overall = cell(model.report.rollup.overall_gcs);
            let buckets = Bucket::ALL
                .iter()
                .map(|b| cell(model.report.rollup.bucket(*b)))
                .collect::<Vec<_>>()
                .join(" ");

            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    overall.bold(),
                    buckets.dimmed(),
                    model.name.cyan()
                )
            } else {
                format!("{} {}  {}  {}", index_str, overall, buckets, model.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
