use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, id: Option<&str>, format: &OutputFormat) -> Result<()> {
    let card = match id {
        Some(id) => app
            .store
            .list_cards()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow::anyhow!("Card '{}' not found", id))?,
        None => app
            .store
            .get_active_card()?
            .ok_or_else(|| anyhow::anyhow!("No active card"))?,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("{}  [{}]", card.title(), card.id);
            if !card.basic.tagline.is_empty() {
                println!("{}", card.basic.tagline);
            }
            if !card.basic.company.is_empty() {
                println!("{}", card.basic.company);
            }
            for value in [
                &card.basic.email,
                &card.basic.phone,
                &card.basic.location,
            ] {
                if !value.is_empty() {
                    println!("{}", value);
                }
            }
            if !card.description.is_empty() {
                println!("\n{}", card.description);
            }
            if !card.services.is_empty() {
                println!("\nServices:");
                for service in &card.services {
                    println!("  - {}", service);
                }
            }
        }
    }

    Ok(())
}
