//! Plain-text per-subject summary report.

use vitalview_core::{Summary, summarize};
use vitalview_model::{Dataset, Metric, SubjectTable};

/// Metrics in report order, with their headings.
pub const REPORT_METRICS: [(Metric, &str); 3] = [
    (Metric::HeartRate, "Heart rate"),
    (Metric::Activity, "Activity"),
    (Metric::Temperature, "Temperature"),
];

/// Render the report for every subject of `dataset`, in dataset order.
pub fn render_report(dataset: &Dataset) -> String {
    let mut out = String::new();
    for table in dataset {
        render_subject(&mut out, table);
    }
    out
}

/// Render one subject block.
pub fn render_subject(out: &mut String, table: &SubjectTable) {
    out.push_str(&format!("Animal: {}\n", table.subject));
    for (metric, heading) in REPORT_METRICS {
        out.push_str(&render_summary(heading, &summarize(table, metric)));
    }
}

fn render_summary(heading: &str, summary: &Summary) -> String {
    let mut block = format!("{heading}:\n  N:   {}\n", summary.count);
    if let (Some(sum), Some(mean)) = (summary.sum, summary.mean) {
        block.push_str(&format!("  Sum: {sum:.2}\n  Avg: {mean:.2}\n"));
    }
    block
}
