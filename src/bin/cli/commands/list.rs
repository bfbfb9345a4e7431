use anyhow::Result;
use chrono::DateTime;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let cards = app.store.list_cards()?;
    let active = app.store.get_active_id()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards in scope {}.", app.store.scope()?);
                return Ok(());
            }

            for card in &cards {
                let marker = if card.id == active { "*" } else { " " };
                let created = DateTime::from_timestamp_millis(card.created_at)
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("{} {:<28} {:<24} {}", marker, card.id, card.title(), created);
            }
            println!("\n{} cards in scope {}", cards.len(), app.store.scope()?);
        }
    }

    Ok(())
}
