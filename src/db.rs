use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use poise::serenity_prelude::UserId;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::models::BirthdayRecord;

/// Database connection pool wrapper
///
/// Handles all storage operations for the bot. Birthdays are stored as epoch
/// seconds of midnight UTC in the sentinel year; only the month and day are
/// semantically meaningful.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        info!("Database connected and migrations completed");
        Ok(db)
    }

    /// Run database migrations to create tables
    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id        TEXT PRIMARY KEY,
                birthdate INTEGER NOT NULL
            ) STRICT
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Save or update a user's birthday in a single transaction
    pub async fn upsert_birthday(
        &self,
        user_id: UserId,
        birthday: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, birthdate) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET birthdate = excluded.birthdate",
        )
        .bind(user_id.to_string())
        .bind(birthday.timestamp())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get a user's stored birthday
    pub async fn get_birthday(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT birthdate FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|(epoch,)| Utc.timestamp_opt(epoch, 0).single()))
    }

    /// Get all users whose stored birthday falls on the given month and day.
    /// The comparison truncates the stored instant to its civil month/day in
    /// UTC; the sentinel year never participates.
    pub async fn birthdays_on(&self, month: u32, day: u32) -> Result<Vec<BirthdayRecord>, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT id, birthdate FROM users WHERE strftime('%m-%d', birthdate, 'unixepoch') = $1",
        )
        .bind(format!("{:02}-{:02}", month, day))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, epoch)| {
                let user_id = id.parse::<u64>().ok().map(UserId::new)?;
                let birthday = Utc.timestamp_opt(epoch, 0).single()?;
                Some(BirthdayRecord { user_id, birthday })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_birthday;

    /// In-memory database on a single connection so every query sees the
    /// same SQLite instance.
    async fn test_db() -> Database {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        let db = Database { pool };
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_upsert_then_lookup_by_month_day() {
        let db = test_db().await;
        let user = UserId::new(42);
        let birthday = parse_birthday("Jun 06").unwrap();

        db.upsert_birthday(user, birthday).await.unwrap();

        let matches = db.birthdays_on(6, 6).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, user);
        assert_eq!(matches[0].birthday, birthday);

        assert!(db.birthdays_on(6, 7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_last_write_wins() {
        let db = test_db().await;
        let user = UserId::new(42);

        db.upsert_birthday(user, parse_birthday("Jun 06").unwrap())
            .await
            .unwrap();
        db.upsert_birthday(user, parse_birthday("Jul 07").unwrap())
            .await
            .unwrap();

        assert!(db.birthdays_on(6, 6).await.unwrap().is_empty());
        let matches = db.birthdays_on(7, 7).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, user);

        let stored = db.get_birthday(user).await.unwrap();
        assert_eq!(stored, Some(parse_birthday("Jul 07").unwrap()));
    }

    #[tokio::test]
    async fn test_leap_day_round_trips() {
        let db = test_db().await;
        let user = UserId::new(7);
        let birthday = parse_birthday("Feb 29").unwrap();

        db.upsert_birthday(user, birthday).await.unwrap();

        let matches = db.birthdays_on(2, 29).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].birthday, birthday);
    }

    #[tokio::test]
    async fn test_invalid_input_writes_nothing() {
        let db = test_db().await;

        assert!(parse_birthday("Foo 99").is_err());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_multiple_users_on_same_day() {
        let db = test_db().await;
        let birthday = parse_birthday("Jun 06").unwrap();

        db.upsert_birthday(UserId::new(1), birthday).await.unwrap();
        db.upsert_birthday(UserId::new(2), birthday).await.unwrap();

        let matches = db.birthdays_on(6, 6).await.unwrap();
        assert_eq!(matches.len(), 2);
    }
}
