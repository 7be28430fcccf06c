use chrono::NaiveDate;
use diesel::dsl::not;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use incollege_shared::errors::{AppError, AppResult, ErrorCode};

use crate::config::JobPostingCapScope;
use crate::models::{
    AppliedJob, ExpiredApplication, JobPosting, NewJobApplication, NewJobMark, NewJobPosting,
    NotificationContext, PostingWithOwner, User,
};
use crate::schema::{job_applications, job_marks, job_postings, users};
use crate::services::experience_service::parse_date;
use crate::services::notification_service;

const CURRENCY_MARKERS: [char; 4] = ['$', '€', '£', '¥'];

pub struct JobInput {
    pub title: String,
    pub description: String,
    pub employer: String,
    pub location: String,
    pub salary: String,
}

pub struct ApplicationInput {
    pub graduation_date: String,
    pub ideal_start_date: String,
    pub cover_letter: String,
}

/// Parse a currency-prefixed amount such as `$85,000` into a positive integer.
pub fn parse_salary(raw: &str) -> AppResult<i64> {
    let invalid = || {
        AppError::new(
            ErrorCode::InvalidSalary,
            format!("invalid salary {raw:?}: expected a currency symbol followed by a whole amount"),
        )
    };

    let amount = raw
        .trim()
        .strip_prefix(|c: char| CURRENCY_MARKERS.contains(&c))
        .ok_or_else(invalid)?;
    if !is_grouped_amount(amount) {
        return Err(invalid());
    }
    let digits: String = amount.chars().filter(|c| *c != ',').collect();

    match digits.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(invalid()),
    }
}

/// Plain digits, or a 1-3 digit lead followed by `,ddd` groups.
fn is_grouped_amount(amount: &str) -> bool {
    let all_digits = |group: &str| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit());

    let mut groups = amount.split(',');
    let lead = groups.next().unwrap_or_default();
    if !all_digits(lead) {
        return false;
    }
    if !amount.contains(',') {
        return true;
    }
    lead.len() <= 3 && groups.all(|g| g.len() == 3 && all_digits(g))
}

fn live_posting(conn: &mut SqliteConnection, job_id: i32) -> AppResult<JobPosting> {
    job_postings::table
        .find(job_id)
        .filter(job_postings::deleted.eq(false))
        .first::<JobPosting>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound, format!("job {job_id} does not exist")))
}

fn live_count(conn: &mut SqliteConnection, owner_id: i32, scope: JobPostingCapScope) -> AppResult<i64> {
    let mut query = job_postings::table
        .filter(job_postings::deleted.eq(false))
        .into_boxed();
    if scope == JobPostingCapScope::PerOwner {
        query = query.filter(job_postings::owner_id.eq(owner_id));
    }
    Ok(query.count().get_result(conn)?)
}

pub fn post_job(
    conn: &mut SqliteConnection,
    owner: &User,
    input: JobInput,
    limit: i64,
    scope: JobPostingCapScope,
) -> AppResult<JobPosting> {
    let salary = parse_salary(&input.salary)?;

    if live_count(conn, owner.id, scope)? >= limit {
        return Err(AppError::new(
            ErrorCode::JobPostingLimitReached,
            format!("limit of {limit} job postings has been reached"),
        ));
    }

    let posting = diesel::insert_into(job_postings::table)
        .values(&NewJobPosting {
            owner_id: owner.id,
            title: input.title,
            description: input.description,
            employer: input.employer,
            location: input.location,
            salary,
            deleted: false,
        })
        .get_result::<JobPosting>(conn)?;

    let announcement = format!("A new job \"{}\" has been posted", posting.title);
    notification_service::fan_out(
        conn,
        owner.id,
        &[NotificationContext::Main, NotificationContext::JobSearch],
        &announcement,
    )?;

    tracing::info!(job_id = posting.id, owner = owner.id, "job posted");
    Ok(posting)
}

/// Tombstone a posting; applications keep pointing at it.
pub fn delete_job(conn: &mut SqliteConnection, owner_id: i32, job_id: i32) -> AppResult<()> {
    let posting = live_posting(conn, job_id)?;
    if posting.owner_id != owner_id {
        return Err(AppError::new(ErrorCode::NotJobOwner, "job was not posted by you"));
    }

    diesel::update(job_postings::table.find(job_id))
        .set(job_postings::deleted.eq(true))
        .execute(conn)?;

    tracing::info!(job_id, owner = owner_id, "job deleted");
    Ok(())
}

pub fn apply(
    conn: &mut SqliteConnection,
    user_id: i32,
    job_id: i32,
    input: ApplicationInput,
    today: NaiveDate,
) -> AppResult<()> {
    let graduation_date = parse_date("graduation_date", &input.graduation_date)?;
    let ideal_start_date = parse_date("ideal_start_date", &input.ideal_start_date)?;

    let posting = live_posting(conn, job_id)?;
    if posting.owner_id == user_id {
        return Err(AppError::new(ErrorCode::CannotApplyOwnJob, "you cannot apply to your own job posting"));
    }

    let already_applied = || AppError::new(ErrorCode::AlreadyApplied, "you have already applied to this job");

    let existing: i64 = job_applications::table
        .filter(job_applications::user_id.eq(user_id))
        .filter(job_applications::job_id.eq(job_id))
        .count()
        .get_result(conn)?;
    if existing > 0 {
        return Err(already_applied());
    }

    diesel::insert_into(job_applications::table)
        .values(&NewJobApplication {
            user_id,
            job_id,
            graduation_date,
            ideal_start_date,
            cover_letter: input.cover_letter,
            application_date: today,
        })
        .execute(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => already_applied(),
            other => AppError::from(other),
        })?;

    tracing::info!(user_id, job_id, "job application submitted");
    Ok(())
}

pub fn list_postings(conn: &mut SqliteConnection) -> AppResult<Vec<PostingWithOwner>> {
    let rows = job_postings::table
        .inner_join(users::table)
        .filter(job_postings::deleted.eq(false))
        .order(job_postings::id.asc())
        .select((JobPosting::as_select(), users::username))
        .load::<(JobPosting, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(posting, username)| PostingWithOwner { posting, username })
        .collect())
}

pub fn list_own_postings(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<JobPosting>> {
    let postings = job_postings::table
        .filter(job_postings::owner_id.eq(user_id))
        .filter(job_postings::deleted.eq(false))
        .order(job_postings::id.asc())
        .load::<JobPosting>(conn)?;
    Ok(postings)
}

pub fn list_applied(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<AppliedJob>> {
    let applied = job_applications::table
        .inner_join(job_postings::table)
        .filter(job_applications::user_id.eq(user_id))
        .filter(job_postings::deleted.eq(false))
        .order(job_applications::id.asc())
        .select((job_applications::job_id, job_postings::title, job_applications::application_date))
        .load::<AppliedJob>(conn)?;
    Ok(applied)
}

/// Live postings the caller neither owns nor has applied to.
pub fn list_unapplied(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<PostingWithOwner>> {
    let applied_ids = job_applications::table
        .filter(job_applications::user_id.eq(user_id))
        .select(job_applications::job_id);

    let rows = job_postings::table
        .inner_join(users::table)
        .filter(job_postings::deleted.eq(false))
        .filter(job_postings::owner_id.ne(user_id))
        .filter(not(job_postings::id.eq_any(applied_ids)))
        .order(job_postings::id.asc())
        .select((JobPosting::as_select(), users::username))
        .load::<(JobPosting, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(posting, username)| PostingWithOwner { posting, username })
        .collect())
}

/// Report applications whose posting has been deleted, consuming them.
pub fn take_expired_applications(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> AppResult<Vec<ExpiredApplication>> {
    let expired: Vec<(i32, i32, String)> = job_applications::table
        .inner_join(job_postings::table)
        .filter(job_applications::user_id.eq(user_id))
        .filter(job_postings::deleted.eq(true))
        .order(job_applications::id.asc())
        .select((job_applications::id, job_applications::job_id, job_postings::title))
        .load(conn)?;

    if expired.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = expired.iter().map(|(id, _, _)| *id).collect();
    diesel::delete(job_applications::table.filter(job_applications::id.eq_any(&ids))).execute(conn)?;

    tracing::info!(user_id, count = ids.len(), "expired applications reported");

    Ok(expired
        .into_iter()
        .map(|(_, job_id, title)| ExpiredApplication { job_id, title })
        .collect())
}

pub fn mark(conn: &mut SqliteConnection, user_id: i32, job_id: i32) -> AppResult<()> {
    live_posting(conn, job_id)?;

    let already_marked = || AppError::new(ErrorCode::AlreadyMarked, "job is already marked");

    let existing: i64 = job_marks::table
        .filter(job_marks::user_id.eq(user_id))
        .filter(job_marks::job_id.eq(job_id))
        .count()
        .get_result(conn)?;
    if existing > 0 {
        return Err(already_marked());
    }

    diesel::insert_into(job_marks::table)
        .values(&NewJobMark { user_id, job_id })
        .execute(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => already_marked(),
            other => AppError::from(other),
        })?;

    tracing::info!(user_id, job_id, "job marked");
    Ok(())
}

pub fn unmark(conn: &mut SqliteConnection, user_id: i32, job_id: i32) -> AppResult<()> {
    let removed = diesel::delete(
        job_marks::table
            .filter(job_marks::user_id.eq(user_id))
            .filter(job_marks::job_id.eq(job_id)),
    )
    .execute(conn)?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::JobNotMarked, "job is not marked"));
    }

    tracing::info!(user_id, job_id, "job unmarked");
    Ok(())
}

pub fn list_marked(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Vec<i32>> {
    let ids = job_marks::table
        .filter(job_marks::user_id.eq(user_id))
        .order(job_marks::job_id.asc())
        .select(job_marks::job_id)
        .load::<i32>(conn)?;
    Ok(ids)
}
