mod commands;
mod constants;
mod dates;
mod db;
mod models;
mod schedule;

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    commands::set_birthday, constants::LOG_DIRECTIVE, db::Database, models::Data,
    schedule::start_daily_announcer,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    // Load configuration from environment
    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to database
    let db = match Database::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize bot data
    let data = Data::new(db);

    // Create and start the bot
    if let Err(e) = start_bot(config, data).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Configuration loaded from environment variables
struct Config {
    discord_token: String,
    database_url: String,
    dev_guild_id: Option<u64>,
}

/// Initialize the logging system
fn initialize_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse().expect("valid log directive")),
        )
        .init();
}

/// Load configuration from environment variables
fn load_configuration() -> Result<Config, Box<dyn std::error::Error>> {
    let discord_token = std::env::var("DISCORD_TOKEN").map_err(|_| {
        "DISCORD_TOKEN environment variable not set. Set it with: export DISCORD_TOKEN=your_bot_token"
    })?;

    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        "DATABASE_URL environment variable not set. Set it with: export DATABASE_URL=sqlite://birthdays.db"
    })?;

    // Optional: role to give users on their birthday. Parsed but not acted
    // upon; no role assignment is performed.
    let birthday_role = std::env::var("BIRTHDAY_ROLE")
        .ok()
        .and_then(|id| id.parse::<u64>().ok())
        .map(serenity::RoleId::new);

    if let Some(role_id) = birthday_role {
        warn!(
            "BIRTHDAY_ROLE is set (role {}) but role assignment is not performed",
            role_id
        );
    }

    // Optional: development guild ID for faster command registration
    let dev_guild_id = std::env::var("DEV_GUILD_ID")
        .ok()
        .and_then(|id| id.parse::<u64>().ok());

    if dev_guild_id.is_some() {
        info!("Development mode: Commands will be registered to guild only");
    }

    Ok(Config {
        discord_token,
        database_url,
        dev_guild_id,
    })
}

/// Create and start the Discord bot
async fn start_bot(
    config: Config,
    data: Data,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Wrap data in Arc for sharing with the daily announcer
    let data_arc = Arc::new(data);
    let data_for_framework = Arc::clone(&data_arc);
    let dev_guild_id = config.dev_guild_id;

    // Create framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![set_birthday()],
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            let http = ctx.http.clone();
            let data_clone = Arc::clone(&data_for_framework);

            // Start the daily announcer
            start_daily_announcer(http, data_clone);
            info!("Daily announcer task started");

            Box::pin(async move {
                // Register commands based on dev_guild_id
                if let Some(guild_id) = dev_guild_id {
                    let guild = serenity::GuildId::new(guild_id);
                    info!("Registering commands in development guild: {}", guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild)
                        .await?;
                    info!("Commands registered in guild {} (instant updates)", guild_id);
                } else {
                    info!("Registering commands globally (may take up to 1 hour)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Commands registered globally");
                }

                info!("Bot is ready!");

                // Return a new clone of the data
                Ok((*data_for_framework).clone())
            })
        })
        .build();

    // Create client with required intents
    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    // Deregister the command surface and stop the shards on interrupt
    let shard_manager = client.shard_manager.clone();
    let http = client.http.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for interrupt signal: {}", e);
            return;
        }

        info!("Interrupt received, deregistering commands...");
        if let Some(guild_id) = dev_guild_id {
            if let Err(e) = serenity::GuildId::new(guild_id)
                .set_commands(&http, Vec::new())
                .await
            {
                error!("Failed to deregister guild commands: {}", e);
            }
        } else if let Err(e) = serenity::Command::set_global_commands(&http, Vec::new()).await {
            error!("Failed to deregister global commands: {}", e);
        }

        shard_manager.shutdown_all().await;
    });

    // Start the bot
    info!("Starting bot...");
    client.start().await?;

    info!("Gracefully shut down");
    Ok(())
}
