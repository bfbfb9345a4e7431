use std::time::Duration;

use anyhow::Result;
use mycard_lib::WizardInput;

use crate::app::App;
use crate::OutputFormat;

/// How long `new` waits for the backend before proceeding anyway.
const PUSH_DEADLINE: Duration = Duration::from_secs(6);

pub async fn run(
    app: &App,
    input: &WizardInput,
    no_push: bool,
    format: &OutputFormat,
) -> Result<()> {
    let card = app.store.create_draft(input)?;

    // Push so the card goes online immediately, but never block on a slow
    // backend: after the deadline the local draft stands on its own.
    if !no_push && app.store.is_logged_in()? {
        let engine = app.engine()?;
        match engine.push_card_with_deadline(&card.id, PUSH_DEADLINE).await {
            Ok(Some(ack)) if ack.ok => {}
            Ok(Some(_)) | Ok(None) => {
                eprintln!("Card created locally, but saving online did not complete.");
            }
            Err(e) => {
                eprintln!("Card created locally, but failed to save online: {}", e);
            }
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => println!("Created card {} ({})", card.id, card.title()),
    }
    Ok(())
}
