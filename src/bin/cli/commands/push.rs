use anyhow::Result;

use crate::app::App;

pub async fn run(app: &App, id: Option<&str>) -> Result<()> {
    let engine = app.engine()?;
    let ack = match id {
        Some(id) => engine.push_card_now(id).await?,
        None => engine.push_active_now().await?,
    };

    if ack.ok {
        println!("Pushed card {}", ack.id);
    } else {
        println!("Backend did not acknowledge the save.");
    }
    Ok(())
}
