use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use shipquote::pricing::{Destination, Fee, RateTable, ShippingType, WeightTier};
use std::path::Path;

use super::resolve_cli_rates;

/// Execute the rates command
pub fn execute(config_path: &Path, rates_path: Option<&Path>) -> Result<()> {
    let (table, currency) = resolve_cli_rates(config_path, rates_path)?;

    println!("{} ({})", "Main shipping".bold(), currency);
    println!("{}", render_main(&table));
    println!();

    println!("{} ({})", "Fees".bold(), currency);
    println!("{}", render_fees(&table));
    println!();

    println!(
        "{}: {:.2}% of the invoice value",
        "Insurance".bold(),
        table.insurance_rate() * 100.0
    );

    Ok(())
}

fn tier_header(first: &str) -> Vec<Cell> {
    std::iter::once(Cell::new(first).fg(Color::Cyan))
        .chain(WeightTier::ALL.iter().map(|tier| Cell::new(tier.as_str()).fg(Color::Cyan)))
        .collect()
}

fn amount_cell(amount: Option<f64>, missing: &str) -> Cell {
    match amount {
        Some(value) => Cell::new(format!("{:.2}", value)).set_alignment(CellAlignment::Right),
        None => Cell::new(missing).fg(Color::DarkGrey),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn render_main(rates: &RateTable) -> Table {
    let mut table = new_table();
    let mut header = vec![Cell::new("METHOD").fg(Color::Cyan)];
    header.extend(tier_header("DESTINATION"));
    table.set_header(header);

    for method in ShippingType::ALL {
        for zone in Destination::ALL {
            let mut row = vec![Cell::new(method.as_str()), Cell::new(zone.as_str())];
            row.extend(
                WeightTier::ALL
                    .iter()
                    .map(|tier| amount_cell(rates.main_price(method, zone, *tier), "contact us")),
            );
            table.add_row(row);
        }
    }

    table
}

fn render_fees(rates: &RateTable) -> Table {
    let mut table = new_table();
    table.set_header(tier_header("FEE"));

    for fee in Fee::ALL {
        let mut row = vec![Cell::new(fee.as_str())];
        row.extend(
            WeightTier::ALL
                .iter()
                .map(|tier| amount_cell(rates.fee(fee, *tier), "-")),
        );
        table.add_row(row);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_main_marks_unsupported_cells() {
        let rendered = render_main(&RateTable::standard()).to_string();
        assert!(rendered.contains("EU COUNTRIES"));
        assert!(rendered.contains("136.00"));
        assert!(rendered.contains("contact us"));
    }

    #[test]
    fn test_render_fees() {
        let rendered = render_fees(&RateTable::standard()).to_string();
        assert!(rendered.contains("16.00"));
        assert!(rendered.contains("9.00"));
    }
}
