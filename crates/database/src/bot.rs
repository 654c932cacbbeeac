//! Bot CRUD operations.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Bot, BotUpdate, NewBot, WebhookSettings};

const BOT_COLUMNS: &str = "id, name, openmic_bot_uid, domain, prompt, \
     voice_settings, webhook_settings, created_at, updated_at";

/// Create a new bot and return the stored row (with server timestamps).
pub async fn create_bot(pool: &SqlitePool, bot: &NewBot) -> Result<Bot> {
    sqlx::query(
        r#"
        INSERT INTO bots (id, name, openmic_bot_uid, domain, prompt, voice_settings, webhook_settings)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&bot.id)
    .bind(&bot.name)
    .bind(&bot.openmic_bot_uid)
    .bind(&bot.domain)
    .bind(&bot.prompt)
    .bind(Json(&bot.voice_settings))
    .bind(Json(&bot.webhook_settings))
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Bot", &bot.id))?;

    get_bot(pool, &bot.id).await
}

/// Get a bot by local ID.
pub async fn get_bot(pool: &SqlitePool, id: &str) -> Result<Bot> {
    sqlx::query_as::<_, Bot>(&format!(
        "SELECT {BOT_COLUMNS} FROM bots WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Bot",
        id: id.to_string(),
    })
}

/// Find a bot by its remote provider identifier.
pub async fn find_bot_by_uid(pool: &SqlitePool, uid: &str) -> Result<Option<Bot>> {
    let bot = sqlx::query_as::<_, Bot>(&format!(
        "SELECT {BOT_COLUMNS} FROM bots WHERE openmic_bot_uid = ?"
    ))
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    Ok(bot)
}

/// List all bots, newest first.
pub async fn list_bots(pool: &SqlitePool) -> Result<Vec<Bot>> {
    let bots = sqlx::query_as::<_, Bot>(&format!(
        "SELECT {BOT_COLUMNS} FROM bots ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(bots)
}

/// Update a bot's editable fields and bump `updated_at`.
pub async fn update_bot(pool: &SqlitePool, id: &str, update: &BotUpdate) -> Result<Bot> {
    let result = sqlx::query(
        r#"
        UPDATE bots
        SET name = ?, domain = ?, prompt = ?, voice_settings = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&update.name)
    .bind(&update.domain)
    .bind(&update.prompt)
    .bind(Json(&update.voice_settings))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Bot",
            id: id.to_string(),
        });
    }

    get_bot(pool, id).await
}

/// Store the remote identifier returned by the provider's create call.
pub async fn set_openmic_uid(pool: &SqlitePool, id: &str, uid: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE bots
        SET openmic_bot_uid = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(uid)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Bot",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Overwrite the webhook settings blob and bump `updated_at`.
pub async fn set_webhook_settings(
    pool: &SqlitePool,
    id: &str,
    settings: &WebhookSettings,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE bots
        SET webhook_settings = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(Json(settings))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Bot",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a bot by ID. Its call logs cascade.
pub async fn delete_bot(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM bots WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Bot",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total bots.
pub async fn count_bots(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bots")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
