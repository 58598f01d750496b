use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chord::commands::{
    general::ping::*,
    music::{
        audio_sources::{Catalog, jiosaavn::JioSaavnClient},
        clear::*,
        leave::*,
        nowplaying::*,
        pause::*,
        play::*,
        playcount::*,
        popular::*,
        queue::*,
        resume::*,
        skip::*,
        sortqueue::*,
        stop::*,
        twenty_four_seven::*,
        utils::{
            autoplay_manager::AutoFillPolicy, music_manager::MusicManager, player::PlayerDeps,
            status::DiscordStatus, voice::SongbirdDriver,
        },
    },
};
use chord::config::Config;
use chord::utils::{database::SettingsDb, play_counts::PlayCountStore};
use chord::{CommandResult, Context, Data, Error, events};

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, owners_only, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chord=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Arc::new(Config::from_env()?);

    let play_counts = Arc::new(PlayCountStore::load(&config.play_counts_path));
    let settings = match SettingsDb::open(&config.settings_db_path) {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(
                "Settings database unavailable at {:?}, 24/7 mode will not persist: {}",
                config.settings_db_path, e
            );
            None
        }
    };

    let http_client = reqwest::Client::new();
    let catalog: Arc<dyn Catalog> = Arc::new(JioSaavnClient::new(
        http_client.clone(),
        &config.jiosaavn_base_url,
    ));

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let commands = vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        // Music commands
        play(),
        pause(),
        resume(),
        skip(),
        stop(),
        leave(),
        clear(),
        queue(),
        nowplaying(),
        playcount(),
        popular(),
        sortqueue(),
        twenty_four_seven(),
    ];

    let framework_config = config.clone();
    let framework_counts = play_counts.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            owners: HashSet::from([serenity::UserId::new(config.owner_id)]),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Logged in as {}", ready.user.name);

                let songbird = songbird::get(ctx)
                    .await
                    .ok_or("Songbird voice client is not registered")?;

                let auto_fill = Arc::new(AutoFillPolicy::new(
                    catalog.clone(),
                    framework_counts.clone(),
                ));
                let deps = PlayerDeps {
                    voice: Arc::new(SongbirdDriver::new(songbird, http_client)),
                    status: Arc::new(DiscordStatus::new(
                        ctx.http.clone(),
                        framework_config.now_playing_emoji_id,
                    )),
                    auto_fill,
                    play_counts: framework_counts,
                };

                let music = Arc::new(MusicManager::new(catalog, deps, settings));
                let restored = music.restore_247().await;
                if restored > 0 {
                    info!("Restored 24/7 mode in {} guilds", restored);
                }

                Ok(Data {
                    music,
                    config: framework_config,
                })
            })
        });

    let client_builder =
        ClientBuilder::new(&config.discord_token, intents).framework(framework.build());

    // Create and run client
    let mut client = client_builder.register_songbird().await?;

    let shard_manager = client.shard_manager.clone();
    let shutdown_counts = play_counts.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutting down");
        if let Err(e) = shutdown_counts.flush() {
            error!("Failed to flush play counts: {}", e);
        }
        shard_manager.shutdown_all().await;
    });

    client.start().await?;

    if let Err(e) = play_counts.flush() {
        error!("Failed to flush play counts: {}", e);
    }
    Ok(())
}
