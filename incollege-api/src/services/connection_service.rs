use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{ConnectedUser, Connection, ConnectionStatus, NewConnection, User, UserSummary};
use crate::schema::{connections, users};
use crate::services::user_service;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NamedUser {
    pub username: String,
}

impl NamedUser {
    fn new(username: &str) -> Self {
        Self { username: username.to_string() }
    }
}

/// Result of a batch accept/deny pass.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsiderOutcome {
    pub accepted: Vec<NamedUser>,
    pub denied: Vec<NamedUser>,
    pub ignored: Vec<NamedUser>,
}

/// The connection row between two users, whichever of them sent the request.
fn find_between(conn: &mut SqliteConnection, a: i32, b: i32) -> AppResult<Option<Connection>> {
    let found = connections::table
        .filter(
            connections::requester_id
                .eq(a)
                .and(connections::target_id.eq(b))
                .or(connections::requester_id.eq(b).and(connections::target_id.eq(a))),
        )
        .first::<Connection>(conn)
        .optional()?;
    Ok(found)
}

pub fn are_connected(conn: &mut SqliteConnection, a: i32, b: i32) -> AppResult<bool> {
    Ok(find_between(conn, a, b)?
        .map(|c| c.status == ConnectionStatus::Accepted.as_str())
        .unwrap_or(false))
}

pub fn request_connection(
    conn: &mut SqliteConnection,
    requester: &User,
    target_username: &str,
) -> AppResult<User> {
    if requester.username == target_username {
        return Err(AppError::new(ErrorCode::CannotConnectSelf, "you cannot connect with yourself"));
    }

    let target = user_service::require_by_username(conn, target_username)?;

    let already_exists = || {
        AppError::new(
            ErrorCode::ConnectionAlreadyExists,
            "you are already connected or one of you has an open request to the other",
        )
    };

    if find_between(conn, requester.id, target.id)?.is_some() {
        return Err(already_exists());
    }

    diesel::insert_into(connections::table)
        .values(&NewConnection {
            requester_id: requester.id,
            target_id: target.id,
            status: ConnectionStatus::Pending.as_str(),
        })
        .execute(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => already_exists(),
            other => AppError::from(other),
        })?;

    tracing::info!(requester = requester.id, target = target.id, "connection requested");
    Ok(target)
}

fn pending_from(conn: &mut SqliteConnection, sender: &str, recipient_id: i32) -> AppResult<Option<i32>> {
    let id = connections::table
        .inner_join(users::table.on(users::id.eq(connections::requester_id)))
        .filter(users::username.eq(sender))
        .filter(connections::target_id.eq(recipient_id))
        .filter(connections::status.eq(ConnectionStatus::Pending.as_str()))
        .select(connections::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(id)
}

/// Accept then deny pending requests addressed to `recipient_id`.
///
/// Each name is resolved against the current state, so a name that was
/// already accepted (or repeated) finds no pending row and is ignored.
pub fn consider_requests(
    conn: &mut SqliteConnection,
    recipient_id: i32,
    accept: &[String],
    deny: &[String],
) -> AppResult<ConsiderOutcome> {
    let mut outcome = ConsiderOutcome::default();

    for sender in accept {
        match pending_from(conn, sender, recipient_id)? {
            Some(id) => {
                diesel::update(connections::table.find(id))
                    .set(connections::status.eq(ConnectionStatus::Accepted.as_str()))
                    .execute(conn)?;
                outcome.accepted.push(NamedUser::new(sender));
            }
            None => outcome.ignored.push(NamedUser::new(sender)),
        }
    }

    for sender in deny {
        match pending_from(conn, sender, recipient_id)? {
            Some(id) => {
                diesel::delete(connections::table.find(id)).execute(conn)?;
                outcome.denied.push(NamedUser::new(sender));
            }
            None => outcome.ignored.push(NamedUser::new(sender)),
        }
    }

    tracing::info!(
        recipient = recipient_id,
        accepted = outcome.accepted.len(),
        denied = outcome.denied.len(),
        ignored = outcome.ignored.len(),
        "connection requests considered"
    );

    Ok(outcome)
}

pub fn pending_requests(conn: &mut SqliteConnection, recipient_id: i32) -> AppResult<Vec<UserSummary>> {
    let senders = connections::table
        .inner_join(users::table.on(users::id.eq(connections::requester_id)))
        .filter(connections::target_id.eq(recipient_id))
        .filter(connections::status.eq(ConnectionStatus::Pending.as_str()))
        .order(connections::id.asc())
        .select((users::username, users::firstname, users::lastname))
        .load::<UserSummary>(conn)?;
    Ok(senders)
}

pub fn list_connections(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<ConnectedUser>> {
    let other_party = users::id
        .eq(connections::requester_id)
        .and(connections::target_id.eq(user_id))
        .or(users::id.eq(connections::target_id).and(connections::requester_id.eq(user_id)));

    let connected = connections::table
        .inner_join(users::table.on(other_party))
        .filter(connections::status.eq(ConnectionStatus::Accepted.as_str()))
        .order(users::id.asc())
        .select((users::id, users::username, users::firstname, users::lastname))
        .load::<ConnectedUser>(conn)?;
    Ok(connected)
}

pub fn disconnect(conn: &mut SqliteConnection, user_id: i32, target_username: &str) -> AppResult<()> {
    let not_connected = || {
        AppError::new(
            ErrorCode::NotConnected,
            format!("unable to disconnect: you are not connected with {target_username}"),
        )
    };

    let target = user_service::find_by_username(conn, target_username)?.ok_or_else(not_connected)?;
    let connection = find_between(conn, user_id, target.id)?
        .filter(|c| c.status == ConnectionStatus::Accepted.as_str())
        .ok_or_else(not_connected)?;

    diesel::delete(connections::table.find(connection.id)).execute(conn)?;

    tracing::info!(user_id, other = target.id, "connection removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::services::test_support::{signup, test_conn};
    use incollege_shared::errors::ErrorKind;

    fn names(list: &[NamedUser]) -> Vec<&str> {
        list.iter().map(|n| n.username.as_str()).collect()
    }

    #[test]
    fn reverse_request_conflicts() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        let bob = signup(&mut conn, "bob", Tier::Standard);

        request_connection(&mut conn, &alice, "bob").unwrap();
        let err = request_connection(&mut conn, &bob, "alice").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ConnectionAlreadyExists));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn request_validates_target() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);

        let own = request_connection(&mut conn, &alice, "alice").unwrap_err();
        assert_eq!(own.kind(), ErrorKind::InvalidInput);
        let unknown = request_connection(&mut conn, &alice, "nobody").unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn accept_is_visible_to_both_parties() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        let bob = signup(&mut conn, "bob", Tier::Standard);

        request_connection(&mut conn, &alice, "bob").unwrap();
        assert_eq!(pending_requests(&mut conn, bob.id).unwrap()[0].username, "alice");

        let outcome = consider_requests(&mut conn, bob.id, &["alice".into()], &[]).unwrap();
        assert_eq!(names(&outcome.accepted), vec!["alice"]);
        assert!(pending_requests(&mut conn, bob.id).unwrap().is_empty());

        assert_eq!(list_connections(&mut conn, alice.id).unwrap()[0].username, "bob");
        assert_eq!(list_connections(&mut conn, bob.id).unwrap()[0].id, alice.id);
    }

    #[test]
    fn accept_wins_when_a_name_is_in_both_lists() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        let bob = signup(&mut conn, "bob", Tier::Standard);
        let carol = signup(&mut conn, "carol", Tier::Standard);
        signup(&mut conn, "dave", Tier::Standard);

        request_connection(&mut conn, &alice, "bob").unwrap();
        request_connection(&mut conn, &carol, "bob").unwrap();

        let outcome = consider_requests(
            &mut conn,
            bob.id,
            &["alice".into(), "alice".into(), "dave".into()],
            &["alice".into(), "carol".into()],
        )
        .unwrap();

        assert_eq!(names(&outcome.accepted), vec!["alice"]);
        assert_eq!(names(&outcome.denied), vec!["carol"]);
        assert_eq!(names(&outcome.ignored), vec!["alice", "dave", "alice"]);
        assert_eq!(list_connections(&mut conn, bob.id).unwrap().len(), 1);

        // a denied requester may ask again
        request_connection(&mut conn, &carol, "bob").unwrap();
    }

    #[test]
    fn disconnect_without_connection_is_not_found_in_either_direction() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        let bob = signup(&mut conn, "bob", Tier::Standard);

        let forward = disconnect(&mut conn, alice.id, "bob").unwrap_err();
        let backward = disconnect(&mut conn, bob.id, "alice").unwrap_err();
        let unknown = disconnect(&mut conn, alice.id, "nobody").unwrap_err();
        assert_eq!(forward.kind(), ErrorKind::NotFound);
        assert_eq!(backward.kind(), ErrorKind::NotFound);
        assert_eq!(unknown.kind(), ErrorKind::NotFound);

        // a pending request is not a connection either
        request_connection(&mut conn, &alice, "bob").unwrap();
        assert_eq!(disconnect(&mut conn, bob.id, "alice").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn disconnect_removes_the_pair() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        let bob = signup(&mut conn, "bob", Tier::Standard);
        request_connection(&mut conn, &alice, "bob").unwrap();
        consider_requests(&mut conn, bob.id, &["alice".into()], &[]).unwrap();

        disconnect(&mut conn, bob.id, "alice").unwrap();
        assert!(list_connections(&mut conn, alice.id).unwrap().is_empty());
        assert!(!are_connected(&mut conn, alice.id, bob.id).unwrap());
    }
}
