use anyhow::Result;
use sqlx::{
    PgPool, Postgres,
    migrate::MigrateDatabase,
    postgres::PgPoolOptions,
};

pub mod models;
pub mod repositories;
pub mod utils;

pub async fn init_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    // Create database if it doesn't exist
    if !Postgres::database_exists(database_url).await.unwrap_or(false) {
        log::info!("Creating database");
        Postgres::create_database(database_url).await?;
    } else {
        log::debug!("Database already exists");
    }

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}
