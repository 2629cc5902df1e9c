mod handlers;
mod keyboards;

use handlers::BotEvent;
use sea_orm::DatabaseConnection;
use std::{error::Error, sync::Arc};
use teloxide::{
    prelude::*,
    types::{Me, Update},
};
use tera::Tera;
use tg_conversation::{
    config::Config, connection, Conversation, DatabaseStorage, InMemStorage, Storage,
};

fn storage(connection: Option<&DatabaseConnection>, namespace: &str) -> Arc<dyn Storage> {
    match connection {
        Some(connection) => Arc::new(DatabaseStorage::new(connection.clone(), namespace)),
        None => Arc::new(InMemStorage::new()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    log::info!("Starting...");
    let config = Config::init();
    log::info!("Initialized config...");

    let _sentry = config.sentry_url.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let database = match &config.db_url {
        Some(db_url) => Some(connection::init(db_url).await?),
        None => {
            log::info!("DB_URL is not set, keeping conversations in memory...");
            None
        }
    };

    let tera = Arc::new(Tera::new("templates/**/*.html")?);
    log::info!("Loaded templates...");

    let contact = Arc::new(handlers::contact_conversation(
        storage(database.as_ref(), "contact"),
        &config,
    ));
    let registration = Arc::new(handlers::registration_conversation(
        storage(database.as_ref(), "registration"),
        contact,
        &config,
    ));

    let bot = Bot::from_env();
    let handler = dptree::entry().endpoint(
        |bot: Bot,
         me: Me,
         update: Update,
         tera: Arc<Tera>,
         registration: Arc<Conversation<BotEvent>>| async move {
            let event = BotEvent {
                bot,
                tera,
                bot_id: me.id,
                bot_name: me.username().to_owned(),
                update,
            };
            if let Err(err) = registration.handle_update(&event).await {
                log::error!("Can't handle update: {:?}", err);
                sentry::capture_error(&err);
            }
            respond(())
        },
    );

    log::info!("Started listening...");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![tera, registration])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
