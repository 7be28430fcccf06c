pub mod connections;
pub mod health;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod preferences;
pub mod profile;
pub mod users;
