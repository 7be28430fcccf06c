use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use metrics::counter;

use incollege_shared::errors::AppResult;

use crate::models::{NewNotification, NotificationContext, NotificationView};
use crate::schema::{notifications, users};

/// Queue `content` for every user except `origin`, once per context.
///
/// Runs on the caller's connection so the notifications commit or roll back
/// with the transition that triggered them.
pub fn fan_out(
    conn: &mut SqliteConnection,
    origin: i32,
    contexts: &[NotificationContext],
    content: &str,
) -> AppResult<usize> {
    let recipients: Vec<i32> = users::table
        .filter(users::id.ne(origin))
        .select(users::id)
        .load(conn)?;

    let rows: Vec<NewNotification> = recipients
        .iter()
        .flat_map(|&user_id| {
            contexts.iter().map(move |context| NewNotification {
                user_id,
                context: context.as_str(),
                content,
            })
        })
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }

    let inserted = diesel::insert_into(notifications::table)
        .values(&rows)
        .execute(conn)?;

    counter!("incollege_notifications_enqueued_total").increment(inserted as u64);
    tracing::debug!(origin, recipients = recipients.len(), inserted, "notifications enqueued");

    Ok(inserted)
}

/// Deliver the queued notifications for one menu, oldest first, and drop them.
pub fn take(
    conn: &mut SqliteConnection,
    user_id: i32,
    context: NotificationContext,
) -> AppResult<Vec<NotificationView>> {
    let pending: Vec<(i32, String)> = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::context.eq(context.as_str()))
        .order((notifications::created_at.asc(), notifications::id.asc()))
        .select((notifications::id, notifications::content))
        .load(conn)?;

    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = pending.iter().map(|(id, _)| *id).collect();
    diesel::delete(notifications::table.filter(notifications::id.eq_any(&ids))).execute(conn)?;

    tracing::debug!(user_id, context = %context, delivered = ids.len(), "notifications delivered");

    Ok(pending
        .into_iter()
        .map(|(_, content)| NotificationView { content })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::services::test_support::{signup, test_conn};

    #[test]
    fn fan_out_skips_origin_and_covers_each_context() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        let bob = signup(&mut conn, "bob", Tier::Standard);
        // drain the signup announcement
        take(&mut conn, alice.id, NotificationContext::Main).unwrap();

        let inserted = fan_out(
            &mut conn,
            bob.id,
            &[NotificationContext::Main, NotificationContext::JobSearch],
            "hello",
        )
        .unwrap();
        assert_eq!(inserted, 2);

        assert!(take(&mut conn, bob.id, NotificationContext::JobSearch).unwrap().is_empty());
        let main = take(&mut conn, alice.id, NotificationContext::Main).unwrap();
        assert_eq!(main, vec![NotificationView { content: "hello".into() }]);
    }

    #[test]
    fn notifications_are_consumed_once() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        signup(&mut conn, "bob", Tier::Standard);
        signup(&mut conn, "carol", Tier::Standard);

        let first = take(&mut conn, alice.id, NotificationContext::Main).unwrap();
        assert_eq!(
            first.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(),
            vec!["Bob Tester has joined InCollege.", "Carol Tester has joined InCollege."]
        );
        assert!(take(&mut conn, alice.id, NotificationContext::Main).unwrap().is_empty());
    }

    #[test]
    fn taking_one_context_leaves_the_other() {
        let mut conn = test_conn();
        let alice = signup(&mut conn, "alice", Tier::Standard);
        fan_out(&mut conn, 0, &[NotificationContext::JobSearch], "job").unwrap();

        assert!(take(&mut conn, alice.id, NotificationContext::Main).unwrap().is_empty());
        assert_eq!(take(&mut conn, alice.id, NotificationContext::JobSearch).unwrap().len(), 1);
    }
}
