use crate::compare::{Comparison, MetricTrends, Trend, sum_entries};
use crate::snapshot::{DeviceTypeStatus, Snapshot};
use std::fmt::Write;
use std::time::{Duration, UNIX_EPOCH};

const HTML_HEADER: &str = r#"<head>
<style>
body { background-color: black; }
table, th, td {
    border:1px solid #669999;
    border-collapse: collapse;
    font-size: 1.3vw;
    font-family: Arial, Helvetica, sans-serif;
    font-weight: bold;
    padding:5px;
    border-bottom:3px solid #669999;
    background-color:#f2f2f2;
}
table { min-width: 100%; }
th { color:#353531; }
.texttime { float: right; font-size: 0.8vw; color:#fff }
</style>
</head>
<body>
"#;

const HTML_FOOTER: &str = "</body>\n";

pub fn render_html(snapshot: &Snapshot, comparison: &Comparison) -> String {
    let mut out = String::from(HTML_HEADER);

    let _ = writeln!(
        out,
        r#"<span class="texttime">{}</span>"#,
        format_taken_at(snapshot.taken_at_unix)
    );

    out.push_str("<table>\n");
    out.push_str("<col width=\"250\">\n");
    for _ in 0..5 {
        out.push_str("<col width=\"40\">\n");
    }
    out.push_str(
        "<tr><th>Device Type</th><th>Total</th><th>Busy</th><th>Idle</th><th>Offline</th><th>Queue</th></tr>\n",
    );

    for entry in &snapshot.entries {
        let trends = comparison
            .devices
            .get(&entry.name)
            .copied()
            .unwrap_or(MetricTrends::NO_BASELINE);
        let _ = writeln!(
            out,
            "<tr><td>{:>23}</td><td>{}{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            entry.name,
            arrow(trends.total),
            entry.total,
            blank_zero(entry.busy, arrow(trends.busy)),
            blank_zero(entry.idle, arrow(trends.idle)),
            blank_zero(entry.offline, arrow(trends.offline)),
            blank_zero(entry.queue_depth, arrow(trends.queue_depth)),
        );
    }

    let totals = sum_entries(snapshot);
    let _ = writeln!(
        out,
        "<tr><td>Totals</td><td>{}{}</td><td>{}{}</td><td>{}{}</td><td>{}{}</td><td>{}{}</td></tr>",
        arrow(comparison.totals.total),
        totals.total,
        arrow(comparison.totals.busy),
        totals.busy,
        arrow(comparison.totals.idle),
        totals.idle,
        arrow(comparison.totals.offline),
        totals.offline,
        arrow(comparison.totals.queue_depth),
        totals.queue_depth,
    );

    out.push_str("</table>\n");
    out.push_str(HTML_FOOTER);
    out
}

pub fn render_text(snapshot: &Snapshot, comparison: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Farm status at {}", format_taken_at(snapshot.taken_at_unix));
    let _ = writeln!(
        out,
        "{:<25} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Device Type", "Total", "Busy", "Idle", "Offline", "Queue"
    );

    for entry in &snapshot.entries {
        let trends = comparison
            .devices
            .get(&entry.name)
            .copied()
            .unwrap_or(MetricTrends::NO_BASELINE);
        let _ = writeln!(out, "{}", text_row(entry, &trends));
    }

    let totals = sum_entries(snapshot);
    let _ = writeln!(out, "{}", text_row(&totals, &comparison.totals));
    out
}

fn text_row(entry: &DeviceTypeStatus, trends: &MetricTrends) -> String {
    format!(
        "{:<25} {:>9} {:>9} {:>9} {:>9} {:>9}",
        entry.name,
        format!("{}{}", marker(trends.total), entry.total),
        format!("{}{}", marker(trends.busy), entry.busy),
        format!("{}{}", marker(trends.idle), entry.idle),
        format!("{}{}", marker(trends.offline), entry.offline),
        format!("{}{}", marker(trends.queue_depth), entry.queue_depth),
    )
}

// Numerically-greater always gets the up arrow; the table does not judge
// whether more busy boards or a deeper queue is good news.
fn arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Improved => "&uArr; ",
        Trend::Worsened => "&dArr; ",
        Trend::Unchanged => "&equals; ",
        Trend::NoBaseline => "",
    }
}

fn marker(trend: Trend) -> &'static str {
    match trend {
        Trend::Improved => "^",
        Trend::Worsened => "v",
        Trend::Unchanged => "=",
        Trend::NoBaseline => "",
    }
}

// Zero counts render as empty cells so the table reads at a glance; the
// snapshot itself always keeps the zeros.
fn blank_zero(value: u64, prefix: &str) -> String {
    if value == 0 {
        String::new()
    } else {
        format!("{prefix}{value}")
    }
}

fn format_taken_at(taken_at_unix: i64) -> String {
    let at = UNIX_EPOCH + Duration::from_secs(taken_at_unix.max(0) as u64);
    humantime::format_rfc3339_seconds(at).to_string()
}
