use super::ui;
use crate::core::RateProvider;
use crate::core::convert::relative_time_label;
use crate::core::rates::{RateRecord, search_rates};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

pub fn display_rates(records: &[&RateRecord], base: &str, now: DateTime<Utc>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell(&format!("Rate (per 1 {base})")),
    ]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.currency),
            Cell::new(&record.currency_name),
            Cell::new(format!("{} {:.4}", record.symbol, record.rate))
                .set_alignment(comfy_table::CellAlignment::Right),
        ]);
    }

    let updated_at = records.first().map(|r| r.updated_at.as_str());
    format!(
        "Exchange rates against {}\n\n{}\n\n{}",
        ui::style_text(base, ui::StyleType::Title),
        table,
        ui::style_text(&relative_time_label(updated_at, now), ui::StyleType::Subtle)
    )
}

pub async fn run(
    provider: &dyn RateProvider,
    base: &str,
    search: Option<&str>,
    force_refresh: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching rates...");
    let result = provider.fetch_rates(Some(base), force_refresh).await;
    spinner.finish_and_clear();
    let records = result?;

    let matches = search_rates(&records, search.unwrap_or_default());
    if matches.is_empty() {
        println!(
            "{}",
            ui::style_text("No currencies match the search", ui::StyleType::Error)
        );
        return Ok(());
    }

    println!("{}", display_rates(&matches, base, now));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateNormalizer;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    #[test]
    fn test_display_rates() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap();
        let raw = BTreeMap::from([("EUR".to_string(), 0.9), ("ZAR".to_string(), 18.0)]);
        let records =
            RateNormalizer::default().normalize(&raw, "USD", Some("2024-01-01T00:00:00Z"), now);
        let refs: Vec<&RateRecord> = records.iter().collect();

        let output = console::strip_ansi_codes(&display_rates(&refs, "USD", now)).to_string();
        assert!(output.contains("Exchange rates against USD"));
        assert!(output.contains("Rate (per 1 USD)"));
        assert!(output.contains("South African Rand"));
        assert!(output.contains("R 18.0000"));
        assert!(output.contains("€ 0.9000"));
        assert!(output.contains("Updated 5 minutes ago"));
    }
}
