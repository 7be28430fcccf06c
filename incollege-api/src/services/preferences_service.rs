use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Deserialize;

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Language, UserPreferences};
use crate::schema::user_preferences;

/// A single-field preference change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceUpdate {
    EmailNotificationsEnabled(bool),
    SmsNotificationsEnabled(bool),
    TargetedAdvertisingEnabled(bool),
    Language(Language),
}

pub fn get(conn: &mut SqliteConnection, user_id: i32) -> AppResult<UserPreferences> {
    user_preferences::table
        .filter(user_preferences::user_id.eq(user_id))
        .first::<UserPreferences>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PreferencesNotFound, "preferences not found"))
}

pub fn set(conn: &mut SqliteConnection, user_id: i32, update: PreferenceUpdate) -> AppResult<()> {
    let current = get(conn, user_id)?;
    let target = user_preferences::table.find(current.id);

    match update {
        PreferenceUpdate::EmailNotificationsEnabled(on) => diesel::update(target)
            .set(user_preferences::email_notifications_enabled.eq(on))
            .execute(conn)?,
        PreferenceUpdate::SmsNotificationsEnabled(on) => diesel::update(target)
            .set(user_preferences::sms_notifications_enabled.eq(on))
            .execute(conn)?,
        PreferenceUpdate::TargetedAdvertisingEnabled(on) => diesel::update(target)
            .set(user_preferences::targeted_advertising_enabled.eq(on))
            .execute(conn)?,
        PreferenceUpdate::Language(language) => diesel::update(target)
            .set(user_preferences::language.eq(language.as_str()))
            .execute(conn)?,
    };

    tracing::info!(user_id, "preferences updated");
    Ok(())
}
