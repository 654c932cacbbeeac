//! SQLite persistence layer for the medical intake dashboard.
//!
//! This crate provides async database operations for bots, patients, and
//! call logs using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{bot, models::NewBot, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:intake.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let new_bot = NewBot {
//!         id: "7b5f0a52-4a4e-4ef0-9a2f-4b2d3c1e8f00".to_string(),
//!         name: "Intake Assistant".to_string(),
//!         openmic_bot_uid: None,
//!         domain: "medical".to_string(),
//!         prompt: String::new(),
//!         voice_settings: Default::default(),
//!         webhook_settings: Default::default(),
//!     };
//!     bot::create_bot(db.pool(), &new_bot).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod call_log;
pub mod error;
pub mod models;
pub mod patient;

pub use error::{DatabaseError, Result};
pub use models::{
    Bot, CallLog, CallLogWithRefs, CallStats, FunctionCallRecord, Patient, PostCallData,
    PreCallData, UrgencyLevel,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub use sqlx::SqlitePool;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn sample_bot(id: &str) -> NewBot {
        NewBot {
            id: id.to_string(),
            name: "Intake Assistant".to_string(),
            openmic_bot_uid: None,
            domain: "medical".to_string(),
            prompt: "You are an intake assistant.".to_string(),
            voice_settings: VoiceSettings {
                voice: Some("alloy".to_string()),
                speed: None,
            },
            webhook_settings: WebhookSettings::default(),
        }
    }

    fn sample_patient() -> PatientFields {
        PatientFields {
            medical_id: "med001".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: "1985-03-14".to_string(),
            phone: "+15551234567".to_string(),
            email: "john.doe@example.com".to_string(),
            allergies: vec!["Penicillin".to_string()],
            medical_history: "Hypertension".to_string(),
            emergency_contact_name: "Jane Doe".to_string(),
            emergency_contact_phone: "+15557654321".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bot_crud() {
        let db = test_db().await;
        let pool = db.pool();

        let bot = bot::create_bot(pool, &sample_bot("bot-1")).await.unwrap();
        assert_eq!(bot.name, "Intake Assistant");
        assert!(bot.openmic_bot_uid.is_none());
        assert!(!bot.created_at.is_empty());

        // Edit form path
        let update = BotUpdate {
            name: "Front Desk".to_string(),
            domain: "medical".to_string(),
            prompt: "Updated prompt".to_string(),
            voice_settings: VoiceSettings::default(),
        };
        let updated = bot::update_bot(pool, "bot-1", &update).await.unwrap();
        assert_eq!(updated.name, "Front Desk");

        // Sync path: uid is stored once, then the bot is findable by uid
        bot::set_openmic_uid(pool, "bot-1", "om-uid-9").await.unwrap();
        let by_uid = bot::find_bot_by_uid(pool, "om-uid-9").await.unwrap();
        assert_eq!(by_uid.unwrap().id, "bot-1");

        let settings = WebhookSettings {
            pre_call_url: Some("http://localhost:8780/api/webhooks/pre-call".to_string()),
            post_call_url: Some("http://localhost:8780/api/webhooks/post-call".to_string()),
            function_calls: vec![],
            synced_at: Some("2025-01-01T00:00:00Z".to_string()),
        };
        bot::set_webhook_settings(pool, "bot-1", &settings).await.unwrap();
        let synced = bot::get_bot(pool, "bot-1").await.unwrap();
        assert_eq!(synced.webhook_settings.0, settings);
        assert_eq!(synced.openmic_bot_uid.as_deref(), Some("om-uid-9"));

        bot::delete_bot(pool, "bot-1").await.unwrap();
        let result = bot::get_bot(pool, "bot-1").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_bots_list_newest_first() {
        let db = test_db().await;
        let pool = db.pool();

        for id in ["bot-a", "bot-b", "bot-c"] {
            bot::create_bot(pool, &sample_bot(id)).await.unwrap();
        }
        let bots = bot::list_bots(pool).await.unwrap();
        assert_eq!(bots.len(), 3);
        // Same-second inserts fall back to id order, still newest first.
        assert_eq!(bots[0].id, "bot-c");
    }

    #[tokio::test]
    async fn test_patient_medical_id_normalized_and_unique() {
        let db = test_db().await;
        let pool = db.pool();

        let patient = patient::create_patient(pool, "pat-1", &sample_patient())
            .await
            .unwrap();
        assert_eq!(patient.medical_id, "MED001");

        // Case-insensitive lookup
        let lower = patient::find_patient_by_medical_id(pool, "med001").await.unwrap();
        let upper = patient::find_patient_by_medical_id(pool, "MED001").await.unwrap();
        assert_eq!(lower.as_ref().map(|p| &p.id), Some(&"pat-1".to_string()));
        assert_eq!(lower, upper);

        // Duplicate medical ID is rejected by the store constraint
        let result = patient::create_patient(pool, "pat-2", &sample_patient()).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_patient_phone_lookup_first_match() {
        let db = test_db().await;
        let pool = db.pool();

        patient::create_patient(pool, "pat-1", &sample_patient()).await.unwrap();
        let mut second = sample_patient();
        second.medical_id = "MED002".to_string();
        second.first_name = "Jim".to_string();
        patient::create_patient(pool, "pat-2", &second).await.unwrap();

        let found = patient::find_patient_by_phone(pool, "+15551234567")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "pat-1");

        let missing = patient::find_patient_by_phone(pool, "+15550000000").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_call_log_lifecycle_and_stats() {
        let db = test_db().await;
        let pool = db.pool();

        bot::create_bot(pool, &sample_bot("bot-1")).await.unwrap();
        patient::create_patient(pool, "pat-1", &sample_patient()).await.unwrap();

        // Pre-call insert
        let new_log = NewCallLog {
            id: "log-1".to_string(),
            bot_id: "bot-1".to_string(),
            openmic_call_id: "call-42".to_string(),
            patient_id: Some("pat-1".to_string()),
            caller_phone: "+15551234567".to_string(),
            call_duration: 0,
            call_status: "pre_call".to_string(),
            transcript: String::new(),
            summary: String::new(),
            function_calls: vec![],
            pre_call_data: None,
            post_call_data: None,
        };
        let log = call_log::insert_call_log(pool, &new_log).await.unwrap();
        assert_eq!(log.call_status, "pre_call");

        // Post-call update, matched by provider call id
        let existing = call_log::find_call_log_by_call_id(pool, "call-42")
            .await
            .unwrap()
            .unwrap();
        let result = CallLogResult {
            patient_id: Some("pat-1".to_string()),
            call_duration: 180,
            call_status: "completed".to_string(),
            transcript: "Patient asked about medication refills.".to_string(),
            summary: "Refill request".to_string(),
            function_calls: vec![],
            post_call_data: PostCallData {
                processed_at: "2025-01-01T00:03:00Z".to_string(),
                follow_up_required: false,
                urgency_level: UrgencyLevel::Low,
                key_concerns: vec!["Medication review".to_string()],
            },
        };
        call_log::update_call_log_result(pool, &existing.id, &result)
            .await
            .unwrap();

        let updated = call_log::get_call_log(pool, "log-1").await.unwrap();
        assert_eq!(updated.call_status, "completed");
        assert_eq!(updated.call_duration, 180);
        assert_eq!(
            updated.post_call_data.as_ref().unwrap().urgency_level,
            UrgencyLevel::Low
        );

        // Joined list view
        let logs = call_log::list_call_logs(pool, 50).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].bot_name, "Intake Assistant");
        assert_eq!(logs[0].patient_medical_id.as_deref(), Some("MED001"));

        let stats = call_log::call_stats(pool).await.unwrap();
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.completed_calls, 1);
        assert_eq!(stats.total_duration, 180);
        assert_eq!(stats.todays_calls, 1);
    }

    #[tokio::test]
    async fn test_deleting_bot_cascades_logs_but_patient_delete_keeps_them() {
        let db = test_db().await;
        let pool = db.pool();

        bot::create_bot(pool, &sample_bot("bot-1")).await.unwrap();
        patient::create_patient(pool, "pat-1", &sample_patient()).await.unwrap();
        call_log::insert_call_log(
            pool,
            &NewCallLog {
                id: "log-1".to_string(),
                bot_id: "bot-1".to_string(),
                openmic_call_id: "call-1".to_string(),
                patient_id: Some("pat-1".to_string()),
                caller_phone: String::new(),
                call_duration: 0,
                call_status: "pre_call".to_string(),
                transcript: String::new(),
                summary: String::new(),
                function_calls: vec![],
                pre_call_data: None,
                post_call_data: None,
            },
        )
        .await
        .unwrap();

        patient::delete_patient(pool, "pat-1").await.unwrap();
        let log = call_log::get_call_log(pool, "log-1").await.unwrap();
        assert!(log.patient_id.is_none());

        bot::delete_bot(pool, "bot-1").await.unwrap();
        let result = call_log::get_call_log(pool, "log-1").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
