use super::ui;
use crate::core::convert::{
    ConversionQuery, build_rate_map, convert, format_output_amount, parse_conversion_query,
    relative_time_label,
};
use crate::core::{RateProvider, TrendProvider};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use futures::future::join;
use tracing::warn;

pub async fn run(
    rates_provider: &dyn RateProvider,
    trend_provider: &dyn TrendProvider,
    query: &str,
    force_refresh: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(ConversionQuery {
        amount,
        from_currency,
        to_currency,
    }) = parse_conversion_query(query)
    else {
        bail!("Could not understand '{query}', expected something like '100 USD to EUR'");
    };

    let spinner = ui::new_spinner(&format!("Converting {from_currency} to {to_currency}..."));
    let (rates, trend) = join(
        rates_provider.fetch_rates(Some(&from_currency), force_refresh),
        trend_provider.fetch_trend(&from_currency, &to_currency, None, force_refresh),
    )
    .await;
    spinner.finish_and_clear();

    let rates = rates?;
    let converted = convert(amount, &from_currency, &to_currency, &build_rate_map(&rates))?;
    let updated_at = rates.first().map(|r| r.updated_at.as_str());

    println!(
        "{} = {}",
        format_output_amount(amount, &from_currency),
        ui::style_text(
            &format_output_amount(converted, &to_currency),
            ui::StyleType::Value
        )
    );
    println!(
        "{}",
        ui::style_text(&relative_time_label(updated_at, now), ui::StyleType::Subtle)
    );

    // Trend is supplementary; a failure only loses the table.
    match trend {
        Ok(points) => println!(
            "\n{}",
            super::trend::display_trend(&from_currency, &to_currency, &points)
        ),
        Err(e) => {
            warn!(error = %e, "Trend unavailable for {}->{}", from_currency, to_currency);
            println!(
                "\n{}",
                ui::style_text(&format!("Trend unavailable: {e}"), ui::StyleType::Subtle)
            );
        }
    }
    Ok(())
}
