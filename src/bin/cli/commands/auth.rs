use anyhow::Result;

use crate::app::App;

pub async fn run_login(app: &App, email: &str, password: &str) -> Result<()> {
    let engine = app.engine()?;
    let auth = engine.login(email, password).await?;

    let name = auth.user.name.as_deref().unwrap_or(email);
    println!("Logged in as {} (scope {})", name, app.store.scope()?);
    Ok(())
}

pub async fn run_register(app: &App, name: &str, email: &str, password: &str) -> Result<()> {
    let engine = app.engine()?;
    engine.register(name, email, password).await?;

    println!("Registered {} (scope {})", email, app.store.scope()?);
    Ok(())
}

pub fn run_logout(app: &App) -> Result<()> {
    app.store.logout()?;
    println!("Logged out; now in scope {}", app.store.scope()?);
    Ok(())
}

pub fn run_whoami(app: &App) -> Result<()> {
    let user = app.store.user()?;
    let scope = app.store.scope()?;

    match (&user.name, &user.email) {
        (Some(name), Some(email)) => println!("{} <{}>", name, email),
        (None, Some(email)) => println!("{}", email),
        _ => println!("guest"),
    }
    println!("scope: {}", scope);
    println!(
        "logged in: {}",
        if app.store.is_logged_in()? { "yes" } else { "no" }
    );
    println!("api base: {}", app.store.api_base()?);
    Ok(())
}
