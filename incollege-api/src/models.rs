use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{
    connections, conversations, experiences, job_applications, job_marks, job_postings, messages,
    notifications, profiles, user_preferences, users,
};

// --- Enumerations stored as text ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Standard,
    Plus,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Plus => "plus",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Tier::Standard),
            "plus" => Ok(Tier::Plus),
            _ => Err(format!("unknown tier: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Pending,
    Accepted,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
        }
    }
}

/// Menu a notification is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationContext {
    #[serde(rename = "main")]
    Main,
    #[serde(rename = "job search/internship")]
    JobSearch,
}

impl NotificationContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationContext::Main => "main",
            NotificationContext::JobSearch => "job search/internship",
        }
    }
}

impl std::fmt::Display for NotificationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Selectable, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password_hash: String,
    pub tier: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn tier(&self) -> Tier {
        self.tier.parse().unwrap_or(Tier::Standard)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub password_hash: &'a str,
    pub tier: &'a str,
}

/// Public identity of a user as shown in listings.
#[derive(Debug, Queryable, Serialize, Deserialize, PartialEq, Clone)]
pub struct UserSummary {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize, Clone)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Profile {
    #[serde(skip)]
    pub id: i32,
    #[serde(skip)]
    pub user_id: i32,
    pub bio: Option<String>,
    pub university: String,
    pub major: String,
    pub years_attended: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile<'a> {
    pub user_id: i32,
    pub university: &'a str,
    pub major: &'a str,
}

// --- Experience ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize, Deserialize, Clone)]
#[diesel(table_name = experiences)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Experience {
    pub id: i32,
    #[serde(skip)]
    pub user_id: i32,
    pub title: String,
    pub employer: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = experiences)]
pub struct NewExperience {
    pub user_id: i32,
    pub title: String,
    pub employer: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
}

// --- Preferences ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize, Clone)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserPreferences {
    #[serde(skip)]
    pub id: i32,
    #[serde(skip)]
    pub user_id: i32,
    pub email_notifications_enabled: bool,
    pub sms_notifications_enabled: bool,
    pub targeted_advertising_enabled: bool,
    pub language: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_preferences)]
pub struct NewUserPreferences {
    pub user_id: i32,
    pub email_notifications_enabled: bool,
    pub sms_notifications_enabled: bool,
    pub targeted_advertising_enabled: bool,
    pub language: String,
}

impl NewUserPreferences {
    pub fn defaults_for(user_id: i32) -> Self {
        Self {
            user_id,
            email_notifications_enabled: true,
            sms_notifications_enabled: true,
            targeted_advertising_enabled: true,
            language: Language::English.as_str().to_string(),
        }
    }
}

// --- Connection ---

#[derive(Debug, Queryable, Identifiable, Selectable, Clone)]
#[diesel(table_name = connections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Connection {
    pub id: i32,
    pub requester_id: i32,
    pub target_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = connections)]
pub struct NewConnection<'a> {
    pub requester_id: i32,
    pub target_id: i32,
    pub status: &'a str,
}

#[derive(Debug, Queryable, Serialize, Deserialize, PartialEq, Clone)]
pub struct ConnectedUser {
    pub id: i32,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

// --- Job postings ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize, Deserialize, Clone)]
#[diesel(table_name = job_postings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobPosting {
    pub id: i32,
    #[serde(skip_serializing)]
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub employer: String,
    pub location: String,
    pub salary: i64,
    #[serde(skip_serializing)]
    pub deleted: bool,
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_postings)]
pub struct NewJobPosting {
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub employer: String,
    pub location: String,
    pub salary: i64,
    pub deleted: bool,
}

/// A live posting together with the username of whoever posted it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostingWithOwner {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub username: String,
}

#[derive(Debug, Queryable, Identifiable, Selectable, Clone)]
#[diesel(table_name = job_applications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobApplication {
    pub id: i32,
    pub user_id: i32,
    pub job_id: i32,
    pub graduation_date: NaiveDate,
    pub ideal_start_date: NaiveDate,
    pub cover_letter: String,
    pub application_date: NaiveDate,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_applications)]
pub struct NewJobApplication {
    pub user_id: i32,
    pub job_id: i32,
    pub graduation_date: NaiveDate,
    pub ideal_start_date: NaiveDate,
    pub cover_letter: String,
    pub application_date: NaiveDate,
}

#[derive(Debug, Queryable, Serialize, Deserialize, PartialEq, Clone)]
pub struct AppliedJob {
    pub job_id: i32,
    pub title: String,
    pub application_date: NaiveDate,
}

#[derive(Debug, Queryable, Serialize, Deserialize, PartialEq, Clone)]
pub struct ExpiredApplication {
    pub job_id: i32,
    pub title: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_marks)]
pub struct NewJobMark {
    pub user_id: i32,
    pub job_id: i32,
}

// --- Messaging ---

#[derive(Debug, Queryable, Identifiable, Selectable, Clone)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Conversation {
    pub id: i32,
    pub user_a: i32,
    pub user_b: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub user_a: i32,
    pub user_b: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage<'a> {
    pub conversation_id: i32,
    pub sender_id: i32,
    pub sent_at: NaiveDateTime,
    pub content: &'a str,
    pub read: bool,
}

/// A message as returned to a conversation participant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MessageView {
    pub time: NaiveDateTime,
    pub content: String,
    pub read: bool,
    pub firstname: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UnreadSummary {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub num_unread: i64,
}

// --- Notifications ---

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification<'a> {
    pub user_id: i32,
    pub context: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NotificationView {
    pub content: String,
}
