//! SQLite storage layer for FloodAlert.
//!
//! The store hands alerts to the query engine in descending creation order
//! and guards every mutation with an ownership check: only the user who
//! created an alert may edit or delete it.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::error::AlertError;
use crate::model::{AlertRecord, Coordinates, Severity};

/// A validated alert ready to be stored.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub city_name: String,
    pub coordinates: Coordinates,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Owner edits to an existing alert. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AlertUpdate {
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub city_name: Option<String>,
}

impl AlertUpdate {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.severity.is_none() && self.city_name.is_none()
    }
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct AlertStore {
    pool: SqlitePool,
}

impl AlertStore {
    /// Create a new store and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:floodalert.db" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // A single connection keeps `sqlite::memory:` databases shared.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.initialize_schema().await?;

        Ok(store)
    }

    async fn initialize_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                user_name TEXT NOT NULL,
                message TEXT NOT NULL,
                city_name TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                severity TEXT NOT NULL DEFAULT 'medium',
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_alerts_created_at
            ON alerts(created_at_ms)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_alerts_user_id
            ON alerts(user_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new alert and return it with its assigned id.
    pub async fn insert_alert(&self, alert: &NewAlert) -> Result<AlertRecord, AlertError> {
        let result = sqlx::query(
            r#"
            INSERT INTO alerts
                (user_id, user_name, message, city_name, latitude, longitude, severity, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&alert.user_id)
        .bind(&alert.user_name)
        .bind(&alert.message)
        .bind(&alert.city_name)
        .bind(alert.coordinates.latitude)
        .bind(alert.coordinates.longitude)
        .bind(alert.severity.as_str())
        .bind(alert.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        self.get_alert(result.last_insert_rowid()).await
    }

    /// All alerts, most recently created first.
    pub async fn list_alerts(&self) -> Result<Vec<AlertRecord>, AlertError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM alerts
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(alert_from_row).collect())
    }

    /// Alerts created by `user_id`, most recently created first.
    pub async fn list_user_alerts(&self, user_id: &str) -> Result<Vec<AlertRecord>, AlertError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM alerts
            WHERE user_id = ?
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(alert_from_row).collect())
    }

    pub async fn get_alert(&self, id: i64) -> Result<AlertRecord, AlertError> {
        let row = sqlx::query("SELECT * FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(alert_from_row)
            .ok_or(AlertError::NotFound(id))
    }

    /// Apply `update` to alert `id` on behalf of `owner_id`.
    ///
    /// Fails with `NotFound` when the alert does not exist and `Forbidden`
    /// when it belongs to someone else.
    pub async fn update_alert(
        &self,
        id: i64,
        owner_id: &str,
        update: &AlertUpdate,
        now: DateTime<Utc>,
    ) -> Result<AlertRecord, AlertError> {
        self.get_owned_alert(id, owner_id).await?;

        sqlx::query(
            r#"
            UPDATE alerts
            SET message = COALESCE(?, message),
                severity = COALESCE(?, severity),
                city_name = COALESCE(?, city_name),
                updated_at_ms = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(update.message.as_deref())
        .bind(update.severity.map(|s| s.as_str()))
        .bind(update.city_name.as_deref())
        .bind(now.timestamp_millis())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        self.get_alert(id).await
    }

    /// Delete alert `id` on behalf of `owner_id`.
    pub async fn delete_alert(&self, id: i64, owner_id: &str) -> Result<(), AlertError> {
        self.get_owned_alert(id, owner_id).await?;

        sqlx::query("DELETE FROM alerts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_owned_alert(&self, id: i64, owner_id: &str) -> Result<AlertRecord, AlertError> {
        let alert = self.get_alert(id).await?;
        if !alert.is_owned_by(owner_id) {
            return Err(AlertError::Forbidden(id));
        }
        Ok(alert)
    }
}

fn alert_from_row(row: &SqliteRow) -> AlertRecord {
    let created_at_ms: i64 = row.get("created_at_ms");
    let updated_at_ms: Option<i64> = row.get("updated_at_ms");
    let severity: Option<String> = row.get("severity");

    AlertRecord {
        id: row.get("id"),
        city_name: row.get("city_name"),
        coordinates: Coordinates::new(row.get("latitude"), row.get("longitude")),
        message: row.get("message"),
        severity: Severity::from_label(severity.as_deref()),
        created_at: DateTime::from_timestamp_millis(created_at_ms).unwrap_or_default(),
        updated_at: updated_at_ms.and_then(DateTime::from_timestamp_millis),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
    }
}
