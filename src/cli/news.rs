use super::ui;
use crate::core::{NewsProvider, NewsRecord};
use anyhow::Result;

pub fn display_news(currency: &str, items: &[NewsRecord]) -> String {
    if items.is_empty() {
        return ui::style_text(
            &format!("No recent news for {currency}"),
            ui::StyleType::Subtle,
        );
    }

    let mut output = format!(
        "Latest news for {}\n",
        ui::style_text(currency, ui::StyleType::Title)
    );
    for item in items {
        output.push('\n');
        output.push_str(&ui::style_text(&item.title, ui::StyleType::Label));
        output.push('\n');
        output.push_str(&ui::style_text(
            &format!("{} | {}", item.source, item.published_at),
            ui::StyleType::Subtle,
        ));
        output.push('\n');
        output.push_str(&item.description);
        output.push('\n');
        if !item.link.is_empty() {
            output.push_str(&item.link);
            output.push('\n');
        }
    }
    output
}

pub async fn run(
    provider: &dyn NewsProvider,
    currency: &str,
    force_refresh: bool,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching news...");
    let result = provider.fetch_news(Some(currency), force_refresh).await;
    spinner.finish_and_clear();
    let items = result?;

    println!("{}", display_news(currency, &items));
    Ok(())
}
