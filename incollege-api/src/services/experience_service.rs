use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Deserialize;

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Experience, NewExperience};
use crate::schema::experiences;

/// Dates arrive as `MM/DD/YYYY`.
pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y")
        .map_err(|_| AppError::invalid_input(format!("invalid {field}: {value}")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperienceInput {
    pub title: String,
    pub employer: String,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// One changed field of an existing entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceEdit {
    Title(String),
    Employer(String),
    StartDate(String),
    EndDate(String),
    Location(String),
    Description(String),
}

/// Split an `{"id": .., <field>: ..}` body into the entry id and its single change.
pub fn parse_edit(mut body: serde_json::Map<String, serde_json::Value>) -> AppResult<(i32, ExperienceEdit)> {
    let format_error = || AppError::invalid_input(r#"expected { "id": id, field: value }"#);

    let id = body
        .remove("id")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(format_error)?;
    if body.len() != 1 {
        return Err(format_error());
    }

    let change = serde_json::from_value::<ExperienceEdit>(serde_json::Value::Object(body))
        .map_err(|e| AppError::invalid_input(e.to_string()))?;
    Ok((id, change))
}

pub fn list(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<Experience>> {
    let entries = experiences::table
        .filter(experiences::user_id.eq(user_id))
        .order(experiences::id.asc())
        .load::<Experience>(conn)?;
    Ok(entries)
}

pub fn add(
    conn: &mut SqliteConnection,
    user_id: i32,
    input: ExperienceInput,
    max_entries: i64,
) -> AppResult<Experience> {
    let existing: i64 = experiences::table
        .filter(experiences::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    if existing >= max_entries {
        return Err(AppError::new(
            ErrorCode::ExperienceLimitReached,
            format!("limit of {max_entries} jobs has been reached"),
        ));
    }

    let entry = NewExperience {
        user_id,
        start_date: parse_date("start_date", &input.start_date)?,
        end_date: parse_date("end_date", &input.end_date)?,
        title: input.title,
        employer: input.employer,
        location: input.location,
        description: input.description,
    };

    let created = diesel::insert_into(experiences::table)
        .values(&entry)
        .get_result::<Experience>(conn)?;

    tracing::info!(user_id, experience_id = created.id, "job history added");
    Ok(created)
}

fn owned(conn: &mut SqliteConnection, user_id: i32, id: i32) -> AppResult<Experience> {
    experiences::table
        .filter(experiences::id.eq(id))
        .filter(experiences::user_id.eq(user_id))
        .first::<Experience>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ExperienceNotFound, "invalid job history id"))
}

pub fn edit(conn: &mut SqliteConnection, user_id: i32, id: i32, change: ExperienceEdit) -> AppResult<()> {
    let entry = owned(conn, user_id, id)?;
    let target = experiences::table.find(entry.id);

    match change {
        ExperienceEdit::Title(v) => diesel::update(target).set(experiences::title.eq(v)).execute(conn)?,
        ExperienceEdit::Employer(v) => diesel::update(target).set(experiences::employer.eq(v)).execute(conn)?,
        ExperienceEdit::StartDate(v) => {
            let date = parse_date("start_date", &v)?;
            diesel::update(target).set(experiences::start_date.eq(date)).execute(conn)?
        }
        ExperienceEdit::EndDate(v) => {
            let date = parse_date("end_date", &v)?;
            diesel::update(target).set(experiences::end_date.eq(date)).execute(conn)?
        }
        ExperienceEdit::Location(v) => diesel::update(target).set(experiences::location.eq(v)).execute(conn)?,
        ExperienceEdit::Description(v) => {
            diesel::update(target).set(experiences::description.eq(v)).execute(conn)?
        }
    };

    tracing::info!(user_id, experience_id = id, "job history edited");
    Ok(())
}

pub fn remove(conn: &mut SqliteConnection, user_id: i32, id: i32) -> AppResult<()> {
    let entry = owned(conn, user_id, id)?;
    diesel::delete(experiences::table.find(entry.id)).execute(conn)?;
    tracing::info!(user_id, experience_id = id, "job history removed");
    Ok(())
}
