use anyhow::Result;
use mycard_lib::RemoteStatus;

use crate::app::App;
use crate::OutputFormat;

pub async fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let engine = app.engine()?;
    let report = engine.sync_now().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.cards)?),
        OutputFormat::Plain => match report.status {
            RemoteStatus::Merged { pulled } => {
                println!("Synced: {} remote cards, {} total.", pulled, report.cards.len());
            }
            RemoteStatus::SkippedNoToken => {
                println!("Not logged in; showing {} local cards.", report.cards.len());
            }
            RemoteStatus::Failed { reason } => {
                println!(
                    "Sync failed ({}); showing {} local cards.",
                    reason,
                    report.cards.len()
                );
            }
        },
    }
    Ok(())
}
