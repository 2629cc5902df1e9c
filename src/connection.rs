use crate::migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::{MigratorTrait, SchemaManager};
use std::error::Error;

pub async fn init(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error>> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.sqlx_logging_level(log::LevelFilter::Debug);
    let connection = Database::connect(opt).await?;
    log::info!("Connected to database...");

    let schema_manager = SchemaManager::new(&connection);
    Migrator::up(&connection, None).await?;
    assert!(schema_manager.has_table("conversation_states").await?);
    log::info!("Applied migrations...");

    Ok(connection)
}
