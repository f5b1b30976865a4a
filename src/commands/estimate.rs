use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use shipquote::pricing::{Estimate, Estimator, QuoteRequest};
use std::{path::Path, sync::Arc};
use tracing::debug;

use super::resolve_cli_rates;
use crate::cli::EstimateArgs;

/// Execute the estimate command
pub fn execute(config_path: &Path, args: EstimateArgs) -> Result<()> {
    if let Some(value) = args.invoice_value {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("--invoice-value must be a non-negative number");
        }
    }

    let (table, currency) = resolve_cli_rates(config_path, args.rates.as_deref())?;
    let request = build_request(&args);

    let estimate = Estimator::new(Arc::new(table)).estimate(&request);
    debug!(total = ?estimate.total, "Estimate computed");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    println!(
        "{} {} / {} / {}",
        "Estimate:".bold(),
        request.shipping_type,
        request.destination,
        request.weight
    );

    match estimate.error() {
        Some(message) => println!("{}", message.yellow()),
        None => println!("{}", render_breakdown(&estimate, &currency)),
    }

    Ok(())
}

fn build_request(args: &EstimateArgs) -> QuoteRequest {
    QuoteRequest {
        shipping_type: args.shipping_type,
        destination: args.destination,
        weight: args.weight,
        invoice_value: args.invoice_value,
        include_insurance: !args.no_insurance,
        include_packaging: !args.no_packaging,
        include_custom_declaration: !args.no_custom_declaration,
        include_forwarding: !args.no_forwarding,
    }
}

/// Breakdown table with one row per present line and a total row
fn render_breakdown(estimate: &Estimate, currency: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("LINE").fg(Color::Cyan),
        Cell::new(format!("AMOUNT ({})", currency)).fg(Color::Cyan),
    ]);

    for (item, amount) in estimate.breakdown.lines() {
        table.add_row(vec![
            Cell::new(item.label()),
            Cell::new(format!("{:.2}", amount)).set_alignment(CellAlignment::Right),
        ]);
    }

    if let Some(total) = estimate.total {
        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(format!("{:.2}", total))
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipquote::pricing::{calculate_estimate, Destination, ShippingType, WeightTier};

    fn args() -> EstimateArgs {
        EstimateArgs {
            shipping_type: ShippingType::Postal,
            destination: Destination::Switzerland,
            weight: WeightTier::UpTo1,
            invoice_value: Some(1000.0),
            no_insurance: false,
            no_packaging: false,
            no_custom_declaration: false,
            no_forwarding: true,
            rates: None,
            json: false,
        }
    }

    #[test]
    fn test_build_request_maps_toggles() {
        let request = build_request(&args());
        assert!(request.include_insurance);
        assert!(!request.include_forwarding);
    }

    #[test]
    fn test_render_breakdown() {
        let estimate = calculate_estimate(&build_request(&args()));
        let rendered = render_breakdown(&estimate, "CHF").to_string();

        assert!(rendered.contains("AMOUNT (CHF)"));
        assert!(rendered.contains("Main shipping"));
        assert!(rendered.contains("8.30"));
        assert!(!rendered.contains("Forwarding"));
        assert!(rendered.contains("45.30"));
    }
}
