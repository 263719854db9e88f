use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use utils::assets::asset_dir;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{DbErr, TransactionTrait};

pub type DbPool = DatabaseConnection;

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Connects to the database and applies pending migrations.
    ///
    /// `DATABASE_URL` overrides the default on-disk sqlite file, which is
    /// how tests point the service at `sqlite::memory:` or a temp file.
    pub async fn new() -> Result<DBService, DbErr> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => format!(
                "sqlite://{}?mode=rwc",
                asset_dir().join("db.sqlite").to_string_lossy()
            ),
        };

        let mut options = ConnectOptions::new(database_url);
        options.max_connections(5).sqlx_logging(false);

        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::debug!("Database ready, migrations applied");

        Ok(DBService { pool })
    }
}
