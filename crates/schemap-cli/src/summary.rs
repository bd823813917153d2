use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use schemap_map::MappingStats;
use schemap_model::{ChangeType, FieldMapping, MappingType, SchemaChange, TransformationLogic};
use schemap_cli::commands::{DiffReport, MapReport, SyncReport};

pub fn print_map_report(report: &MapReport, with_transformations: bool, with_stats: bool) {
    println!("Source: {}", report.source_id);
    println!("Target: {}", report.target_id);
    println!("{}", mapping_table(&report.mappings));
    if !report.unmapped_targets.is_empty() {
        println!("Unmapped target fields: {}", report.unmapped_targets.join(", "));
    }
    if with_transformations {
        println!();
        println!("Transformations:");
        println!("{}", transformation_table(&report.transformations));
    }
    if with_stats {
        println!();
        print_stats(&report.stats);
    }
    if let Some(path) = &report.saved_to {
        println!("Saved: {}", path.display());
    }
}

pub fn print_diff_report(report: &DiffReport) {
    println!(
        "Source: {} (v{} -> v{})",
        report.source_id, report.baseline_version, report.current_version
    );
    if report.changes.is_empty() {
        println!("No changes.");
        return;
    }
    println!("{}", change_table(&report.changes));
}

pub fn print_sync_report(report: &SyncReport) {
    println!("Source: {}", report.source_id);
    println!("Target: {}", report.target_id);
    if report.changes.is_empty() {
        println!("No changes; baseline mappings kept.");
    } else {
        println!("{}", change_table(&report.changes));
    }
    println!(
        "Mappings: {} before, {} after",
        report.baseline_mappings.len(),
        report.mappings.len()
    );
    println!("{}", mapping_table(&report.mappings));
    print_stats(&report.stats);
}

fn mapping_table(mappings: &[FieldMapping]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Type"),
        header_cell("Confidence"),
        header_cell("Transformation"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for mapping in mappings {
        table.add_row(vec![
            Cell::new(&mapping.source_field),
            Cell::new(&mapping.target_field),
            mapping_type_cell(mapping.mapping_type),
            confidence_cell(mapping.confidence),
            match &mapping.transformation {
                Some(template) => Cell::new(template),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

fn transformation_table(transformations: &[TransformationLogic]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Target"),
        header_cell("Declarative"),
        header_cell("Imperative"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for logic in transformations {
        table.add_row(vec![
            Cell::new(&logic.mapping.target_field)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            optional_cell(logic.declarative.as_deref()),
            optional_cell(logic.imperative.as_deref()),
            Cell::new(&logic.description),
        ]);
    }
    table
}

fn change_table(changes: &[SchemaChange]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Change"),
        header_cell("Field"),
        header_cell("Old"),
        header_cell("New"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for change in changes {
        table.add_row(vec![
            change_type_cell(change.change_type),
            Cell::new(&change.field_name),
            optional_cell(change.old_value.as_deref()),
            optional_cell(change.new_value.as_deref()),
        ]);
    }
    table
}

fn print_stats(stats: &MappingStats) {
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    println!(
        "Mappings: {}  mean: {}  min: {}  max: {}  high confidence: {}",
        stats.mapping_count,
        show(stats.mean_confidence),
        show(stats.min_confidence),
        show(stats.max_confidence),
        stats.high_confidence_count
    );
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn mapping_type_cell(mapping_type: MappingType) -> Cell {
    let cell = Cell::new(mapping_type.as_str());
    match mapping_type {
        MappingType::Direct => cell.fg(Color::Green),
        MappingType::Transformed => cell.fg(Color::Yellow),
        MappingType::Derived => cell.fg(Color::Magenta),
    }
}

fn change_type_cell(change_type: ChangeType) -> Cell {
    let cell = Cell::new(change_type.as_str()).add_attribute(Attribute::Bold);
    match change_type {
        ChangeType::Added => cell.fg(Color::Green),
        ChangeType::Removed => cell.fg(Color::Red),
        ChangeType::TypeChanged => cell.fg(Color::Yellow),
        ChangeType::Modified => cell.fg(Color::DarkYellow),
    }
}

fn confidence_cell(confidence: f64) -> Cell {
    let color = if confidence > 0.8 {
        Color::Green
    } else if confidence > 0.5 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{confidence:.2}")).fg(color)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
