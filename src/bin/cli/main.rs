mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mycard-cli", about = "mycard digital business card CLI", version)]
struct Cli {
    /// Data directory (default: platform-local app data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List cards in the current scope
    List,

    /// Show a card (the active card when no id is given)
    Show {
        /// Card id
        id: Option<String>,
    },

    /// Create a draft from wizard answers and push it to the backend
    New {
        /// Your name (shown on the card)
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        job_title: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Skip the backend push
        #[arg(long)]
        no_push: bool,
    },

    /// Delete a card locally and (best-effort) on the backend
    Remove {
        /// Card id
        id: String,
    },

    /// Pull the remote card list and merge it into the local scope
    Sync,

    /// Push a card to the backend (the active card when no id is given)
    Push {
        /// Card id
        id: Option<String>,
    },

    /// Log in and adopt the returned identity
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Register a new account
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the stored identity (scoped card data stays)
    Logout,

    /// Show the current scope and login state
    Whoami,

    /// Set the backend base URL
    SetApi { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.data_dir.as_deref())?;

    match cli.command {
        Command::List => commands::list::run(&app, &cli.format),
        Command::Show { id } => commands::show::run(&app, id.as_deref(), &cli.format),
        Command::New {
            name,
            job_title,
            company,
            email,
            phone,
            location,
            no_push,
        } => {
            let input = mycard_lib::WizardInput {
                name,
                job_title,
                company,
                email,
                phone,
                location,
            };
            commands::new::run(&app, &input, no_push, &cli.format).await
        }
        Command::Remove { id } => commands::remove::run(&app, &id).await,
        Command::Sync => commands::sync::run(&app, &cli.format).await,
        Command::Push { id } => commands::push::run(&app, id.as_deref()).await,
        Command::Login { email, password } => {
            commands::auth::run_login(&app, &email, &password).await
        }
        Command::Register {
            name,
            email,
            password,
        } => commands::auth::run_register(&app, &name, &email, &password).await,
        Command::Logout => commands::auth::run_logout(&app),
        Command::Whoami => commands::auth::run_whoami(&app),
        Command::SetApi { url } => {
            app.store.set_api_base(&url)?;
            println!("API base set to {}", app.store.api_base()?);
            Ok(())
        }
    }
}
