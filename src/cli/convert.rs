use super::ui;
use crate::core::amount::Amount;
use crate::core::{FetchOutcome, RatePoint, RateQuery, RateResult};
use crate::server::convert::UNAVAILABLE_MESSAGE;
use crate::service::ConversionService;
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment, Table};

pub async fn run(
    service: &ConversionService,
    query: &RateQuery,
    amount: Option<&str>,
    with_history: bool,
) -> Result<()> {
    // Reject bad input before any upstream call.
    let amount = amount.map(Amount::parse).transpose()?;

    let pb = ui::new_spinner(&format!("Fetching {query} rate..."));
    let outcome = service.convert(query).await;
    pb.finish_and_clear();

    let result = match outcome {
        FetchOutcome::Success(result) => result,
        FetchOutcome::Failure(reason) => {
            println!("{}", ui::style_text(UNAVAILABLE_MESSAGE, ui::StyleType::Error));
            bail!("All rate providers failed: {reason}");
        }
    };

    println!(
        "\n{}",
        ui::style_text(&format!("{} to {}", query.from, query.to), ui::StyleType::Title)
    );
    println!("{}", rate_table(query, &result, amount));

    if with_history {
        if result.history.is_empty() {
            println!(
                "{}",
                ui::style_text("No historical data available", ui::StyleType::Subtle)
            );
        } else {
            println!("\n{}", ui::style_text("History", ui::StyleType::Label));
            println!("{}", history_table(&result.history));
        }
    }
    Ok(())
}

fn rate_table(query: &RateQuery, result: &RateResult, amount: Option<Amount>) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Pair"), ui::header_cell("Rate")]);
    table.add_row(vec![
        Cell::new(format!("{}/{}", query.from, query.to)),
        ui::rate_cell(result.regular_rate),
    ]);
    table.add_row(vec![
        Cell::new(format!("{}/{}", query.to, query.from)),
        ui::rate_cell(result.inverse_rate),
    ]);

    if let Some(amount) = amount {
        table.add_row(vec![
            Cell::new(format!("{:.2} {}", amount.value(), query.from)),
            Cell::new(format!(
                "{} {}",
                ui::style_text(
                    &format!("{:.2}", amount.convert(result.regular_rate)),
                    ui::StyleType::Value
                ),
                query.to
            ))
            .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// One row per point, with the change against the previous point.
fn history_table(history: &[RatePoint]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Rate"),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<f64> = None;
    for point in history {
        let change = previous.map(|p| (point.rate - p) / p * 100.0);
        table.add_row(vec![
            Cell::new(point.timestamp.format("%Y-%m-%d")),
            ui::rate_cell(point.rate),
            change.map_or_else(ui::na_cell, ui::change_cell),
        ]);
        previous = Some(point.rate);
    }
    table
}
