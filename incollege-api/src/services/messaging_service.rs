use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Conversation, MessageView, NewConversation, NewMessage, Tier, UnreadSummary, User};
use crate::schema::{conversations, messages, users};
use crate::services::{connection_service, user_service};

fn find_conversation(conn: &mut SqliteConnection, a: i32, b: i32) -> AppResult<Option<Conversation>> {
    let found = conversations::table
        .filter(
            conversations::user_a
                .eq(a)
                .and(conversations::user_b.eq(b))
                .or(conversations::user_a.eq(b).and(conversations::user_b.eq(a))),
        )
        .first::<Conversation>(conn)
        .optional()?;
    Ok(found)
}

/// Resolve the counterpart and the conversation shared with them.
fn require_conversation(
    conn: &mut SqliteConnection,
    user_id: i32,
    counterpart: &str,
) -> AppResult<(User, Conversation)> {
    let other = user_service::require_by_username(conn, counterpart)?;
    let conversation = find_conversation(conn, user_id, other.id)?.ok_or_else(|| {
        AppError::new(
            ErrorCode::ConversationNotFound,
            format!("no conversation with {counterpart}"),
        )
    })?;
    Ok((other, conversation))
}

fn insert_message(
    conn: &mut SqliteConnection,
    conversation_id: i32,
    sender_id: i32,
    content: &str,
    now: NaiveDateTime,
) -> AppResult<()> {
    diesel::insert_into(messages::table)
        .values(&NewMessage {
            conversation_id,
            sender_id,
            sent_at: now,
            content,
            read: false,
        })
        .execute(conn)?;
    Ok(())
}

/// Open a conversation with its first message.
///
/// Standard-tier users may only message people they are connected with.
pub fn start_conversation(
    conn: &mut SqliteConnection,
    initiator: &User,
    target_username: &str,
    content: &str,
    now: NaiveDateTime,
) -> AppResult<()> {
    if initiator.username == target_username {
        return Err(AppError::new(ErrorCode::CannotMessageSelf, "you cannot message yourself"));
    }

    let target = user_service::require_by_username(conn, target_username)?;

    let exists = || AppError::new(ErrorCode::ConversationExists, "conversation already exists");
    if find_conversation(conn, initiator.id, target.id)?.is_some() {
        return Err(exists());
    }

    if initiator.tier() == Tier::Standard
        && !connection_service::are_connected(conn, initiator.id, target.id)?
    {
        return Err(AppError::new(
            ErrorCode::MessagingNotAllowed,
            format!("you are not connected with {target_username}"),
        ));
    }

    let conversation = diesel::insert_into(conversations::table)
        .values(&NewConversation {
            user_a: initiator.id,
            user_b: target.id,
        })
        .get_result::<Conversation>(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => exists(),
            other => AppError::from(other),
        })?;

    insert_message(conn, conversation.id, initiator.id, content, now)?;

    tracing::info!(
        conversation_id = conversation.id,
        initiator = initiator.id,
        target = target.id,
        "conversation started"
    );
    Ok(())
}

pub fn send_message(
    conn: &mut SqliteConnection,
    sender_id: i32,
    counterpart: &str,
    content: &str,
    now: NaiveDateTime,
) -> AppResult<()> {
    let (_, conversation) = require_conversation(conn, sender_id, counterpart)?;
    insert_message(conn, conversation.id, sender_id, content, now)?;
    tracing::info!(conversation_id = conversation.id, sender = sender_id, "message sent");
    Ok(())
}

/// Return the whole conversation, then mark the counterpart's messages read.
/// The returned flags are the ones seen before this fetch.
pub fn fetch_messages(
    conn: &mut SqliteConnection,
    user_id: i32,
    counterpart: &str,
) -> AppResult<Vec<MessageView>> {
    let (_, conversation) = require_conversation(conn, user_id, counterpart)?;

    let rows: Vec<(NaiveDateTime, String, bool, String)> = messages::table
        .inner_join(users::table.on(users::id.eq(messages::sender_id)))
        .filter(messages::conversation_id.eq(conversation.id))
        .order((messages::sent_at.asc(), messages::id.asc()))
        .select((messages::sent_at, messages::content, messages::read, users::firstname))
        .load(conn)?;

    let marked = diesel::update(
        messages::table
            .filter(messages::conversation_id.eq(conversation.id))
            .filter(messages::sender_id.ne(user_id))
            .filter(messages::read.eq(false)),
    )
    .set(messages::read.eq(true))
    .execute(conn)?;

    tracing::debug!(conversation_id = conversation.id, user_id, marked, "messages read");

    Ok(rows
        .into_iter()
        .map(|(time, content, read, firstname)| MessageView { time, content, read, firstname })
        .collect())
}

pub fn delete_conversation(conn: &mut SqliteConnection, user_id: i32, counterpart: &str) -> AppResult<()> {
    let (_, conversation) = require_conversation(conn, user_id, counterpart)?;

    diesel::delete(messages::table.filter(messages::conversation_id.eq(conversation.id))).execute(conn)?;
    diesel::delete(conversations::table.find(conversation.id)).execute(conn)?;

    tracing::info!(conversation_id = conversation.id, user_id, "conversation deleted");
    Ok(())
}

/// One entry per conversation with the number of counterpart messages not yet read.
pub fn unread_summary(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<UnreadSummary>> {
    let counterparts: Vec<(i32, String, String, String)> = conversations::table
        .inner_join(
            users::table.on(users::id
                .eq(conversations::user_a)
                .and(conversations::user_b.eq(user_id))
                .or(users::id.eq(conversations::user_b).and(conversations::user_a.eq(user_id)))),
        )
        .order(conversations::id.asc())
        .select((conversations::id, users::username, users::firstname, users::lastname))
        .load(conn)?;

    counterparts
        .into_iter()
        .map(|(conversation_id, username, firstname, lastname)| -> AppResult<UnreadSummary> {
            let num_unread: i64 = messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .filter(messages::sender_id.ne(user_id))
                .filter(messages::read.eq(false))
                .count()
                .get_result(conn)?;
            Ok(UnreadSummary { username, firstname, lastname, num_unread })
        })
        .collect()
}
