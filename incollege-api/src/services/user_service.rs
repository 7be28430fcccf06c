use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    NewProfile, NewUser, NewUserPreferences, NotificationContext, Tier, User, UserSummary,
};
use crate::schema::{profiles, user_preferences, users};
use crate::services::{notification_service, password_service};

pub struct SignupInput {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    /// Argon2 PHC string, computed before the write transaction opens.
    pub hashed_password: String,
    pub tier: Tier,
    pub university: String,
    pub major: String,
}

/// Optional equality filters for the directory search; absent fields match anyone.
#[derive(Debug, Default)]
pub struct LookupFilter {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
}

/// Capitalize the first letter of every word. `None` when nothing but whitespace remains.
pub fn title_case(value: &str) -> Option<String> {
    let words: Vec<String> = value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

pub fn list_users(conn: &mut SqliteConnection) -> AppResult<Vec<UserSummary>> {
    let users = users::table
        .order(users::id.asc())
        .select((users::username, users::firstname, users::lastname))
        .load::<UserSummary>(conn)?;
    Ok(users)
}

pub fn lookup_users(conn: &mut SqliteConnection, filter: &LookupFilter) -> AppResult<Vec<UserSummary>> {
    let mut query = users::table
        .inner_join(profiles::table)
        .select((users::username, users::firstname, users::lastname))
        .order(users::id.asc())
        .into_boxed();

    if let Some(firstname) = &filter.firstname {
        query = query.filter(users::firstname.eq(firstname));
    }
    if let Some(lastname) = &filter.lastname {
        query = query.filter(users::lastname.eq(lastname));
    }
    if let Some(university) = &filter.university {
        query = query.filter(profiles::university.eq(university));
    }
    if let Some(major) = &filter.major {
        query = query.filter(profiles::major.eq(major));
    }

    Ok(query.load::<UserSummary>(conn)?)
}

pub fn find_by_username(conn: &mut SqliteConnection, username: &str) -> AppResult<Option<User>> {
    let user = users::table
        .filter(users::username.eq(username))
        .first::<User>(conn)
        .optional()?;
    Ok(user)
}

/// Resolve a named counterpart, failing with `UserNotFound`.
pub fn require_by_username(conn: &mut SqliteConnection, username: &str) -> AppResult<User> {
    find_by_username(conn, username)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, format!("user {username} not found")))
}

/// Resolve the caller of an authenticated request. A token for an account
/// that no longer exists is treated like a bad credential.
pub fn require_user(conn: &mut SqliteConnection, user_id: i32) -> AppResult<User> {
    users::table
        .find(user_id)
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::unauthorized("account no longer exists"))
}

/// Create the user, their profile and default preferences, then announce them.
pub fn signup(conn: &mut SqliteConnection, input: &SignupInput, max_users: i64) -> AppResult<User> {
    let university = title_case(&input.university)
        .ok_or_else(|| AppError::invalid_input("university must not be empty"))?;
    let major = title_case(&input.major)
        .ok_or_else(|| AppError::invalid_input("major must not be empty"))?;

    let existing: i64 = users::table.count().get_result(conn)?;
    if existing >= max_users {
        return Err(AppError::new(
            ErrorCode::UserLimitReached,
            format!("limit of {max_users} users has been reached"),
        ));
    }

    if find_by_username(conn, &input.username)?.is_some() {
        return Err(AppError::new(
            ErrorCode::UsernameTaken,
            "the username you chose has already been taken",
        ));
    }

    let user = diesel::insert_into(users::table)
        .values(&NewUser {
            username: &input.username,
            firstname: &input.firstname,
            lastname: &input.lastname,
            password_hash: &input.hashed_password,
            tier: input.tier.as_str(),
        })
        .get_result::<User>(conn)?;

    diesel::insert_into(profiles::table)
        .values(&NewProfile {
            user_id: user.id,
            university: &university,
            major: &major,
        })
        .execute(conn)?;

    diesel::insert_into(user_preferences::table)
        .values(&NewUserPreferences::defaults_for(user.id))
        .execute(conn)?;

    let announcement = format!("{} {} has joined InCollege.", user.firstname, user.lastname);
    notification_service::fan_out(conn, user.id, &[NotificationContext::Main], &announcement)?;

    tracing::info!(user_id = user.id, username = %user.username, tier = %input.tier, "user signed up");

    Ok(user)
}

/// Check a username and password digest pair.
pub fn authenticate(conn: &mut SqliteConnection, username: &str, password: &str) -> AppResult<User> {
    let invalid = || AppError::new(ErrorCode::InvalidCredentials, "invalid username or password");

    let user = find_by_username(conn, username)?.ok_or_else(invalid)?;
    if !password_service::verify_password(password, &user.password_hash)? {
        tracing::info!(username, "login rejected");
        return Err(invalid());
    }

    Ok(user)
}
