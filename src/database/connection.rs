use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type DbConn = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbConn> {
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .sqlx_logging(false);

    let conn = Database::connect(opts).await?;
    Ok(conn)
}

pub async fn run_migrations(conn: &DbConn) -> AppResult<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
