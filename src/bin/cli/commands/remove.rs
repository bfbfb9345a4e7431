use anyhow::Result;

use crate::app::App;

pub async fn run(app: &App, id: &str) -> Result<()> {
    if !app.store.list_cards()?.iter().any(|c| c.id == id) {
        anyhow::bail!("Card '{}' not found", id);
    }

    let engine = app.engine()?;
    engine.remove_card(id).await?;
    println!("Removed card {}", id);
    Ok(())
}
