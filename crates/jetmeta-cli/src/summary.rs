//! Human-readable descriptor summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use jetmeta_model::MetadataDescriptor;

pub fn print_summary(descriptor: &MetadataDescriptor) {
    println!("Tree: {}", descriptor.tree_name);
    println!("Files: {}", descriptor.input_files.len());
    println!("Events: {}", descriptor.total_events());
    if let Some(selection) = &descriptor.selection {
        println!("Selection: {selection}");
    }

    let mut labels = Table::new();
    apply_table_style(&mut labels);
    labels.set_header(vec![
        header_cell("Label"),
        header_cell("Class weight"),
        header_cell("Events"),
    ]);
    align_column(&mut labels, 1, CellAlignment::Right);
    align_column(&mut labels, 2, CellAlignment::Right);
    for (label, info) in &descriptor.reweight_info {
        let events: f64 = info.raw_hist.iter().sum();
        labels.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{:.4}", info.class_weight)),
            Cell::new(events),
        ]);
    }
    println!("{labels}");

    let mut vars = Table::new();
    apply_table_style(&mut vars);
    vars.set_header(vec![
        header_cell("Variable"),
        header_cell("Size"),
        header_cell("Min"),
        header_cell("Max"),
        header_cell("Mean"),
        header_cell("Std"),
        header_cell("Median"),
        header_cell("Upper"),
    ]);
    for column in 1..8 {
        align_column(&mut vars, column, CellAlignment::Right);
    }
    for name in &descriptor.var_fields {
        let Some(stats) = descriptor.var_stats.get(name) else {
            continue;
        };
        let size = stats
            .size
            .map_or_else(|| "-".to_string(), |size| size.to_string());
        vars.add_row(vec![
            Cell::new(name),
            Cell::new(size),
            Cell::new(format!("{:.4}", stats.min)),
            Cell::new(format!("{:.4}", stats.max)),
            Cell::new(format!("{:.4}", stats.mean)),
            Cell::new(format!("{:.4}", stats.std)),
            Cell::new(format!("{:.4}", stats.median)),
            Cell::new(format!("{:.4}", stats.upper)),
        ]);
    }
    println!("{vars}");
}

fn apply_table_style(table: &mut Table) {
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
