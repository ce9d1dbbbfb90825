use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shimarin_bot::anilist;
use shimarin_bot::commands;
use shimarin_bot::config::Config;
use shimarin_bot::database::PgConnectionStore;
use shimarin_bot::handler::Handler;
use shimarin_bot::model::AppState;
use shimarin_bot::ui::InteractionRouter;

const CONFIG_PATH: &str = "config.yml";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = ?e, "fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load(CONFIG_PATH)?;

    let Some(token) = config.discord_token() else {
        anyhow::bail!("no token provided in environment variables or config.yml");
    };
    let Some(database_url) = config.database_url() else {
        anyhow::bail!("no database URL provided in environment variables or config.yml");
    };
    let secret = config.anilist_secret().unwrap_or_default();

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&database_url)
        .await?;
    info!("connected to database");

    let anilist = Arc::new(anilist::Client::new(
        config.anilist.api_client_id,
        secret,
    )?);
    let registry = commands::build_registry()?;
    info!(commands = registry.len(), "command registry built");

    let state = Arc::new(AppState {
        config,
        registry,
        anilist,
        store: Arc::new(PgConnectionStore::new(pool)),
        router: Arc::new(InteractionRouter::new()),
    });

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&token, intents)
        .event_handler(Handler)
        .await?;
    {
        let mut data = client.data.write().await;
        data.insert::<AppState>(state);
    }

    client.start().await?;
    Ok(())
}
