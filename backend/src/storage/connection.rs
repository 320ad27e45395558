use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:medibot.db";

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Create patients table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                name TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for account_id filtering
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_patients_account_id
            ON patients(account_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Create medications table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS medications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                dosage TEXT NOT NULL,
                instructions TEXT NOT NULL,
                schedule_time TEXT NOT NULL,
                recurrence TEXT NOT NULL DEFAULT 'Daily',
                stock INTEGER NOT NULL DEFAULT 30,
                max_stock INTEGER NOT NULL DEFAULT 30,
                last_taken TEXT,
                FOREIGN KEY (patient_id) REFERENCES patients (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for patient_id filtering
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_medications_patient_id
            ON medications(patient_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Create activity_log table (append-only, never updated or deleted)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS activity_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                detail TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for listing an account's log newest-first
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_activity_log_account_timestamp
            ON activity_log(account_id, timestamp DESC);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
