use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Profile, User};
use crate::schema::profiles;
use crate::services::{connection_service, user_service};

/// The caller's own profile joined with their account details.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileView {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub tier: String,
    pub bio: Option<String>,
    pub university: String,
    pub major: String,
    pub years_attended: Option<i32>,
}

/// A single-field profile change; the JSON body must carry exactly one key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileEdit {
    Bio(String),
    University(String),
    Major(String),
    YearsAttended(i32),
}

fn load_profile(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub fn get_profile(conn: &mut SqliteConnection, user: &User) -> AppResult<ProfileView> {
    let profile = load_profile(conn, user.id)?;
    Ok(ProfileView {
        username: user.username.clone(),
        firstname: user.firstname.clone(),
        lastname: user.lastname.clone(),
        tier: user.tier.clone(),
        bio: profile.bio,
        university: profile.university,
        major: profile.major,
        years_attended: profile.years_attended,
    })
}

pub fn edit_profile(conn: &mut SqliteConnection, user_id: i32, edit: ProfileEdit) -> AppResult<()> {
    let profile = load_profile(conn, user_id)?;
    let target = profiles::table.find(profile.id);

    match edit {
        ProfileEdit::Bio(bio) => {
            diesel::update(target).set(profiles::bio.eq(bio)).execute(conn)?;
        }
        ProfileEdit::University(value) => {
            let university = user_service::title_case(&value)
                .ok_or_else(|| AppError::invalid_input("university must not be empty"))?;
            diesel::update(target).set(profiles::university.eq(university)).execute(conn)?;
        }
        ProfileEdit::Major(value) => {
            let major = user_service::title_case(&value)
                .ok_or_else(|| AppError::invalid_input("major must not be empty"))?;
            diesel::update(target).set(profiles::major.eq(major)).execute(conn)?;
        }
        ProfileEdit::YearsAttended(years) => {
            if years < 0 {
                return Err(AppError::invalid_input(format!("invalid years_attended: {years}")));
            }
            diesel::update(target).set(profiles::years_attended.eq(years)).execute(conn)?;
        }
    }

    tracing::info!(user_id, "profile edited");
    Ok(())
}

/// Profile of a user the caller is connected to.
pub fn friend_profile(conn: &mut SqliteConnection, user_id: i32, friend_id: i32) -> AppResult<Profile> {
    if !connection_service::are_connected(conn, user_id, friend_id)? {
        return Err(AppError::new(
            ErrorCode::NotConnected,
            format!("you are not connected to the user with id {friend_id}"),
        ));
    }
    load_profile(conn, friend_id)
}
