use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use incollege_shared::clients::db::ConnectionOptions;

use crate::models::{Tier, User};
use crate::run_migrations;
use crate::services::password_service;
use crate::services::user_service::{self, SignupInput};

/// A migrated in-memory database with foreign keys enforced.
pub fn test_conn() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").expect("open in-memory sqlite");
    ConnectionOptions::default().apply(&mut conn).expect("apply pragmas");
    run_migrations(&mut conn).expect("migrate");
    conn
}

pub fn signup(conn: &mut SqliteConnection, username: &str, tier: Tier) -> User {
    let input = SignupInput {
        username: username.to_string(),
        firstname: capitalize(username),
        lastname: "Tester".to_string(),
        hashed_password: password_service::hash_password(&format!("{username}-digest")).expect("hash"),
        tier,
        university: "usf".to_string(),
        major: "computer science".to_string(),
    };
    user_service::signup(conn, &input, 100).expect("signup")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
