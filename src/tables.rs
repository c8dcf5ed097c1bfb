use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{CostedUnit, ProductionPlan},
    quantity::power::Megawatts,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

#[must_use]
pub fn build_merit_order_table(units: &[CostedUnit<'_>]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["#", "Name", "Type", "Cost", "Min", "Available", "Max"]);
    for (index, unit) in units.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).add_attribute(Attribute::Dim),
            Cell::new(&unit.unit.name),
            Cell::new(unit.unit.kind).fg(unit.unit.kind.color()),
            Cell::new(unit.cost).set_alignment(CellAlignment::Right),
            Cell::new(unit.floor).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(unit.capacity).set_alignment(CellAlignment::Right).fg(if unit.can_run() {
                Color::Reset
            } else {
                Color::Red
            }),
            Cell::new(unit.unit.max_power)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

#[must_use]
pub fn build_plan_table(plan: &ProductionPlan) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Name", "Type", "Cost", "Power", "Hourly cost"]);
    for allocation in &plan.allocations {
        table.add_row(vec![
            Cell::new(&allocation.name),
            Cell::new(allocation.kind).fg(allocation.kind.color()),
            Cell::new(allocation.cost).set_alignment(CellAlignment::Right),
            Cell::new(allocation.power).set_alignment(CellAlignment::Right).fg(
                if allocation.power > Megawatts::ZERO { Color::Green } else { Color::Reset },
            ),
            Cell::new(allocation.power * allocation.cost).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(plan.total()).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
        Cell::new(plan.cost).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
    ]);
    table
}
