//! Terminal rendering of pipeline results

use anyhow::Result;
use comfy_table::{
    Cell, CellAlignment, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};
use schemawise_analyzer::{CorrelationReport, PerfSample, QueryStatistics, Recommendation};
use schemawise_bench::{ThroughputStats, TimingStats};
use schemawise_core::Schema;
use serde::Serialize;

/// Pretty-printed JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn new_table<'a>(headers: impl IntoIterator<Item = &'a str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.into_iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

fn number(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

pub fn schema_summary(schema: &Schema) -> Table {
    let mut table = new_table(["Table", "Columns", "Has PK", "Foreign Keys", "Indexes"]);
    for (name, def) in schema.tables() {
        let has_pk = if def.primary_key.is_empty() { "No" } else { "Yes" };
        table.add_row(vec![
            Cell::new(name),
            number(def.column_count),
            Cell::new(has_pk),
            number(def.foreign_key_count()),
            number(def.index_count()),
        ]);
    }
    table
}

pub fn table_access(stats: &QueryStatistics) -> Table {
    let mut table = new_table(["Table", "Access Count", "Percentage"]);
    let total = stats.counts.total.max(1) as f64;
    for (name, count) in stats.most_accessed() {
        table.add_row(vec![
            Cell::new(name),
            number(count),
            number(format!("{:.1}%", count as f64 / total * 100.0)),
        ]);
    }
    table
}

pub fn correlation(report: &CorrelationReport) -> Table {
    let mut table = new_table([
        "Table",
        "Accesses",
        "Joins",
        "Columns",
        "Indexes",
        "Foreign Keys",
        "Normalization",
    ]);
    for (name, m) in &report.table_metrics {
        table.add_row(vec![
            Cell::new(name),
            number(m.access_count),
            number(m.join_count),
            number(m.column_count),
            number(m.index_count),
            number(m.foreign_key_count),
            number(format!("{:.1}", m.normalization_score)),
        ]);
    }
    table
}

pub fn recommendations(recs: &[Recommendation]) -> Table {
    let mut table = new_table(["#", "Action", "Table", "Confidence", "Reason"]);
    for (i, rec) in recs.iter().enumerate() {
        table.add_row(vec![
            number(i + 1),
            Cell::new(rec.action).fg(action_color(rec.confidence)),
            Cell::new(&rec.table),
            number(format!("{}%", rec.confidence)),
            Cell::new(&rec.reason),
        ]);
    }
    table
}

fn action_color(confidence: u8) -> Color {
    match confidence {
        80..=100 => Color::Green,
        60..=79 => Color::Yellow,
        _ => Color::Reset,
    }
}

pub fn perf_sample(sample: &PerfSample) -> Table {
    let mut table = new_table(["Metric", "Value"]);
    let join = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    table.add_row(vec![Cell::new("Sequential scans"), Cell::new(join(&sample.sequential_scans))]);
    table.add_row(vec![Cell::new("Index scans"), Cell::new(join(&sample.index_scans))]);
    table.add_row(vec![Cell::new("Scan operations"), number(sample.scan_operations)]);
    table.add_row(vec![Cell::new("Search operations"), number(sample.search_operations)]);
    if let Some(ms) = sample.execution_time_ms {
        table.add_row(vec![Cell::new("Execution time"), number(format!("{:.2} ms", ms))]);
    }
    table.add_row(vec![
        Cell::new("Performance score"),
        number(format!("{} / 100", sample.performance_score())),
    ]);
    table
}

pub fn timing(stats: &TimingStats) -> Table {
    let mut table = new_table(["Iterations", "Min (ms)", "Median (ms)", "Avg (ms)", "Max (ms)", "Stdev"]);
    table.add_row(vec![
        number(stats.iterations),
        number(format!("{:.3}", stats.min)),
        number(format!("{:.3}", stats.median)),
        number(format!("{:.3}", stats.avg)),
        number(format!("{:.3}", stats.max)),
        number(format!("{:.3}", stats.stdev)),
    ]);
    table
}

pub fn throughput(stats: &ThroughputStats) -> Table {
    let mut table = new_table(["Workers", "Duration (s)", "Queries", "QPS", "Avg latency (ms)", "Max latency (ms)"]);
    table.add_row(vec![
        number(stats.workers),
        number(format!("{:.1}", stats.duration_seconds)),
        number(stats.total_queries),
        number(format!("{:.1}", stats.queries_per_second)),
        number(format!("{:.3}", stats.avg_latency_ms)),
        number(format!("{:.3}", stats.max_latency_ms)),
    ]);
    table
}
