use super::ui;
use crate::core::{TrendPoint, TrendProvider};
use anyhow::Result;
use comfy_table::Cell;

/// Cross rate `from -> to` for a point; `None` when the source rate is zero.
fn cross_rate(point: &TrendPoint) -> Option<f64> {
    (point.from_rate != 0.0).then(|| point.to_rate / point.from_rate)
}

pub fn display_trend(from: &str, to: &str, points: &[TrendPoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(from),
        ui::header_cell(to),
        ui::header_cell(&format!("1 {from} in {to}")),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<f64> = None;
    for point in points {
        let cross = cross_rate(point);
        let change = match (previous, cross) {
            (Some(prev), Some(curr)) if prev != 0.0 => Some((curr - prev) / prev * 100.0),
            _ => None,
        };
        table.add_row(vec![
            Cell::new(&point.label),
            ui::number_cell(point.from_rate, 4),
            ui::number_cell(point.to_rate, 4),
            cross.map_or_else(|| Cell::new("-"), |c| ui::number_cell(c, 4)),
            ui::change_cell(change),
        ]);
        previous = cross;
    }

    format!(
        "{} {} {}\n\n{}",
        ui::style_text(from, ui::StyleType::Title),
        ui::style_text("->", ui::StyleType::Subtle),
        ui::style_text(to, ui::StyleType::Title),
        table
    )
}

pub async fn run(
    provider: &dyn TrendProvider,
    from: &str,
    to: &str,
    base: Option<&str>,
    force_refresh: bool,
) -> Result<()> {
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();

    let spinner = ui::new_spinner("Fetching trend...");
    let result = provider.fetch_trend(&from, &to, base, force_refresh).await;
    spinner.finish_and_clear();

    println!("{}", display_trend(&from, &to, &result?));
    Ok(())
}
