//! Trophy Bot - awards random trophies, keeps a leaderboard and runs a quiz on Telegram.

use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;
use tokio::net::TcpListener;

use trophy_bot::transport::telegram;
use trophy_bot::{
    logging, routes, Config, ImageClient, QuizBank, RewardCatalog, SessionHandler,
    SqliteUserStore, TelegramTransport, UserStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure TELEGRAM_BOT_TOKEN (or BOT__TELEGRAM__TOKEN) is set.",
            e
        )
    })?;

    // Initialize tracing
    logging::init(&config.logging.level);

    tracing::info!("Starting trophy-bot {}", env!("CARGO_PKG_VERSION"));

    // Initialize components
    let store: Arc<dyn UserStore> = Arc::new(SqliteUserStore::open(&config.database.url)?);
    let rewards = RewardCatalog::new(config.rewards.clone())?;
    let quiz = QuizBank::new(config.quiz.clone())?;
    let images = ImageClient::new(Duration::from_secs(config.images.timeout_secs))?;
    tracing::info!("Image downloads time out after {}s", config.images.timeout_secs);

    let bot = Bot::new(&config.telegram.token);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let handler = Arc::new(SessionHandler::new(store.clone(), rewards, quiz, images, transport));

    // Start health endpoint
    if config.health.enabled {
        let addr = config.health_addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Health endpoint listening on {}", addr);

        let app = routes::health::router(store);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Health endpoint stopped: {}", e);
            }
        });
    }

    telegram::register_commands(&bot).await;
    telegram::run(bot, handler).await;

    tracing::info!("Shutting down");
    Ok(())
}
