pub mod formatter;
pub mod storage;

pub use formatter::{
    format_breakdown, format_diagnostics_summary, format_json, format_percent, format_ranking,
    format_summary, format_tsv, should_use_colors, ScoredModel,
};
pub use storage::{save_report, ReportFile};
