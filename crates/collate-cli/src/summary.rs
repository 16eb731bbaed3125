//! Rendering of comparison results for the terminal.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use collate_model::{
    ComparisonResult, ConfidenceThresholds, MatchConfig, MatchedPair, Record,
};

use collate_match::comparator::explain_pair;

pub fn print_summary(result: &ComparisonResult, config: &MatchConfig, options: &DisplayOptions) {
    let summary = result.summary();
    println!(
        "Compared {} left against {} right records",
        summary.left_total, summary.right_total
    );

    let mut table = Table::new();
    style_table(&mut table);
    table.set_header(vec![
        header_cell("Bucket"),
        header_cell("Count"),
        header_cell("Detail"),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    let tiers = summary
        .matched_by_tier
        .iter()
        .map(|(tier, count)| format!("{tier}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    table.add_row(vec![
        Cell::new("matched").fg(Color::Green),
        Cell::new(summary.matched),
        Cell::new(if tiers.is_empty() { "-".to_string() } else { tiers }),
    ]);
    table.add_row(vec![
        Cell::new("ambiguous").fg(Color::Yellow),
        Cell::new(summary.ambiguous_groups),
        Cell::new(format!(
            "{} candidate(s) held for review",
            summary.ambiguous_candidates
        )),
    ]);
    table.add_row(vec![
        Cell::new("unmatched left"),
        Cell::new(summary.unmatched_left),
        Cell::new("-"),
    ]);
    table.add_row(vec![
        Cell::new("unmatched right"),
        Cell::new(summary.unmatched_right),
        Cell::new("-"),
    ]);
    table.add_row(vec![
        Cell::new("avg confidence").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", summary.average_confidence)),
        Cell::new(confidence_detail(result)),
    ]);
    println!("{table}");

    if !result.matched.is_empty() {
        print_matched(result, config, options);
    }
    if !result.ambiguous.is_empty() {
        print_ambiguous(result);
    }
    if options.show_unmatched {
        print_unmatched("Unmatched left", &result.unmatched_left, config);
        print_unmatched("Unmatched right", &result.unmatched_right, config);
    }
}

/// Flags controlling how much detail the report carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    pub explain: bool,
    pub show_unmatched: bool,
}

fn print_matched(result: &ComparisonResult, config: &MatchConfig, options: &DisplayOptions) {
    let mut table = Table::new();
    style_table(&mut table);
    table.set_header(vec![
        header_cell("Left"),
        header_cell("Right"),
        header_cell("Tier"),
        header_cell("Score"),
        header_cell("Fields"),
    ]);
    align_column(&mut table, 3, CellAlignment::Right);
    for pair in &result.matched {
        table.add_row(vec![
            Cell::new(pair_label(&pair.left, config)),
            Cell::new(pair_label(&pair.right, config)),
            Cell::new(pair.tier.as_str()),
            score_cell(pair.score),
            Cell::new(pair.matched_fields.join(", ")),
        ]);
    }
    println!("Matched pairs:");
    println!("{table}");

    if options.explain {
        for pair in &result.matched {
            print_explanation(pair, config);
        }
    }
}

fn print_explanation(pair: &MatchedPair, config: &MatchConfig) {
    println!(
        "{} ~ {} ({} @ {:.2})",
        pair.left.id,
        pair.right.id,
        pair.tier,
        pair.score
    );
    for breakdown in explain_pair(&pair.left, &pair.right, config) {
        println!(
            "  {}: {:.0}% (weight {})",
            breakdown.field,
            breakdown.similarity * 100.0,
            breakdown.weight
        );
    }
}

fn print_ambiguous(result: &ComparisonResult) {
    println!("Needs review:");
    for group in &result.ambiguous {
        println!("  left '{}':", group[0].left_id);
        for candidate in group {
            println!(
                "    right '{}' ({} @ {:.2})",
                candidate.right_id, candidate.tier, candidate.score
            );
        }
    }
}

fn print_unmatched(label: &str, records: &[Record], config: &MatchConfig) {
    if records.is_empty() {
        return;
    }
    println!("{label}:");
    for record in records {
        println!("  {}", pair_label(record, config));
    }
}

/// "id (primary text)" when the primary field is present, else just the id.
fn pair_label(record: &Record, config: &MatchConfig) -> String {
    match record.text(&config.primary_field) {
        Some(text) if !text.is_empty() => format!("{} ({text})", record.id),
        _ => record.id.clone(),
    }
}

fn confidence_detail(result: &ComparisonResult) -> String {
    let counts = result.count_by_level(&ConfidenceThresholds::default());
    if counts.is_empty() {
        return "-".to_string();
    }
    counts
        .iter()
        .rev()
        .map(|(level, count)| format!("{}: {count}", level.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn style_table(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn score_cell(score: f64) -> Cell {
    let cell = Cell::new(format!("{score:.2}"));
    if score >= 0.95 {
        cell.fg(Color::Green)
    } else if score >= 0.80 {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::Red)
    }
}
