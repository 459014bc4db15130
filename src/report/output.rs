use crate::model::{ReportRow, WeeklyReport};
use crate::util::format_float;
use console::style;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 9] = [
    "User",
    "Date",
    "Commits",
    "Lines Added",
    "Lines Removed",
    "Files Changed",
    "Test Files Changed",
    "Time per Line (min)",
    "Cost per Line",
];

/// Quote a field only when it holds a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<W: Write>(out: &mut W, fields: &[String]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    write!(out, "{}\r\n", line.join(","))
}

fn row_fields(row: &ReportRow) -> Vec<String> {
    vec![
        row.author.clone(),
        row.date.format("%Y-%m-%d").to_string(),
        row.commits.to_string(),
        row.added.to_string(),
        row.removed.to_string(),
        row.files_changed.to_string(),
        row.test_files_changed.to_string(),
        format_float(row.time_per_line),
        format_float(row.cost_per_line),
    ]
}

pub fn write_csv<W: Write>(report: &WeeklyReport, out: &mut W) -> std::io::Result<()> {
    let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
    csv_line(out, &header)?;
    for row in report.rows() {
        csv_line(out, &row_fields(row))?;
    }
    Ok(())
}

pub fn write_csv_file(report: &WeeklyReport, path: &Path) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    write_csv(report, &mut buf)?;
    std::fs::write(path, buf)?;
    log::info!("Wrote {} rows to {}", report.rows().count(), path.display());
    Ok(())
}

pub fn output_json(report: &WeeklyReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn output_console(report: &WeeklyReport) -> anyhow::Result<()> {
    if report.users.is_empty() {
        println!("No activity since {}", report.week_start.format("%Y-%m-%d"));
    }

    for user in &report.users {
        println!("User: {}", style(&user.author).bold());
        for row in &user.rows {
            println!(
                "  Date: {}, Commits: {}, Lines Added: {}, Lines Removed: {}, Files Changed: {}, Test Files Changed: {}, Time per Line: {} min",
                row.date.format("%Y-%m-%d"),
                row.commits,
                style(row.added).green(),
                style(row.removed).red(),
                row.files_changed,
                row.test_files_changed,
                format_float(row.time_per_line),
            );
        }
        let t = &user.total;
        println!(
            "Total for {}: Commits: {}, Lines Added: {}, Lines Removed: {}, Files Changed: {}, Test Files Changed: {}, {} min/line, {}€/line\n",
            user.author,
            t.commits,
            t.added,
            t.removed,
            t.files_changed,
            t.test_files_changed,
            format_float(t.time_per_line),
            style(format_float(t.cost_per_line)).yellow(),
        );
    }

    let o = &report.overall;
    println!("{}", style("Overall Total for All Users:").bold());
    println!(
        "Total Commits: {}, Total Lines Added: {}, Total Lines Removed: {}, Total Files Changed: {}, Total Test Files Changed: {}",
        style(o.commits).cyan(),
        style(o.added).green(),
        style(o.removed).red(),
        o.files_changed,
        o.test_files_changed,
    );
    if o.large_commits > 0 || o.bad_messages > 0 {
        println!(
            "Large commits: {}, Short messages: {}",
            style(o.large_commits).yellow(),
            style(o.bad_messages).yellow(),
        );
    }
    Ok(())
}
