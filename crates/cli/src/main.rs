use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use folio_app::{modules::auth, App};
use folio_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Folio book catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Issue an access/refresh token pair for an existing user
    IssueToken {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load Folio settings")?;
    folio_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => App::build(settings).await?.serve().await,
        Command::Migrate => {
            let app = App::build(settings).await?;
            app.pool.close().await;
            tracing::info!("database is up to date");
            Ok(())
        }
        Command::IssueToken { username } => issue_token(settings, &username).await,
    }
}

async fn issue_token(settings: Settings, username: &str) -> anyhow::Result<()> {
    let app = App::build(settings).await?;
    let users = auth::store::UserStore::new(app.pool.clone());
    if !users.exists(username).await? {
        bail!("unknown user '{}'", username);
    }

    let pair = auth::token_service(&app.settings.auth)?.issue_pair(username)?;
    println!("{}", serde_json::to_string_pretty(&pair)?);
    Ok(())
}
