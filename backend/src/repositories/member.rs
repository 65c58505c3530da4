//! Data access for the member roster.

use chrono::{NaiveDate, Utc};
use sqlx::QueryBuilder;

use crate::db::connection::DbPool;
use crate::models::member::{
    renewal_for, BulkField, BulkUpdateRequest, BulkUpdateResponse, Member, MemberQuery,
    MemberStats, MembershipType, UpdateMemberRequest,
};
use crate::repositories::login_log;

const MEMBER_COLUMNS: &str = "member_id, name, date_of_birth, address, blood_group, phone, \
     image_url, membership_type, joined_on, renewal_on, password_hash, created_at, updated_at";

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

pub async fn find_by_id(pool: &DbPool, member_id: &str) -> Result<Option<Member>, sqlx::Error> {
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {} FROM members WHERE member_id = ?",
        MEMBER_COLUMNS
    ))
    .bind(member_id)
    .fetch_optional(pool)
    .await?;

    Ok(member)
}

/// Lists members ordered by name, applying the optional search term and
/// exact filters of [`MemberQuery`].
pub async fn list(pool: &DbPool, query: &MemberQuery) -> Result<Vec<Member>, sqlx::Error> {
    let mut builder: QueryBuilder<sqlx::Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM members WHERE 1 = 1", MEMBER_COLUMNS));

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        builder.push(" AND (name LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR member_id LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR phone LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(blood_group) = query.blood_group.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND blood_group = ");
        builder.push_bind(blood_group.to_string());
    }
    if let Some(membership_type) = query.membership_type {
        builder.push(" AND membership_type = ");
        builder.push_bind(membership_type.as_str());
    }
    builder.push(" ORDER BY name");

    builder.build_query_as::<Member>().fetch_all(pool).await
}

pub async fn insert(pool: &DbPool, member: &Member) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO members ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        MEMBER_COLUMNS
    ))
    .bind(&member.member_id)
    .bind(&member.name)
    .bind(member.date_of_birth)
    .bind(&member.address)
    .bind(&member.blood_group)
    .bind(&member.phone)
    .bind(&member.image_url)
    .bind(member.membership_type.as_str())
    .bind(member.joined_on)
    .bind(member.renewal_on)
    .bind(&member.password_hash)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts a member unless the id is already taken. Returns `true` when the
/// row was written. Roster imports rely on this never overwriting.
pub async fn insert_ignore(pool: &DbPool, member: &Member) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&format!(
        "INSERT OR IGNORE INTO members ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        MEMBER_COLUMNS
    ))
    .bind(&member.member_id)
    .bind(&member.name)
    .bind(member.date_of_birth)
    .bind(&member.address)
    .bind(&member.blood_group)
    .bind(&member.phone)
    .bind(&member.image_url)
    .bind(member.membership_type.as_str())
    .bind(member.joined_on)
    .bind(member.renewal_on)
    .bind(&member.password_hash)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Rewrites a member's editable fields, recomputing the renewal date from
/// the submitted membership data. Returns `false` when the id is unknown.
pub async fn update(
    pool: &DbPool,
    member_id: &str,
    payload: &UpdateMemberRequest,
) -> Result<bool, sqlx::Error> {
    let renewal_on = renewal_for(payload.membership_type, payload.joined_on);

    let result = sqlx::query(
        "UPDATE members SET name = ?, date_of_birth = ?, address = ?, blood_group = ?, \
         phone = ?, image_url = ?, membership_type = ?, joined_on = ?, renewal_on = ?, \
         updated_at = ? WHERE member_id = ?",
    )
    .bind(&payload.name)
    .bind(payload.date_of_birth)
    .bind(&payload.address)
    .bind(&payload.blood_group)
    .bind(&payload.phone)
    .bind(&payload.image_url)
    .bind(payload.membership_type.as_str())
    .bind(payload.joined_on)
    .bind(renewal_on)
    .bind(Utc::now())
    .bind(member_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a member together with their login log rows.
pub async fn delete(pool: &DbPool, member_id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM login_logs WHERE member_id = ?")
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM members WHERE member_id = ?")
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Applies one field to many members. Parse failures and unknown ids are
/// collected per member; membership changes keep the renewal date
/// consistent with the stored joining date.
pub async fn bulk_update(
    pool: &DbPool,
    request: &BulkUpdateRequest,
) -> Result<BulkUpdateResponse, sqlx::Error> {
    let mut updated = 0;
    let mut errors = Vec::new();

    for member_id in &request.member_ids {
        match apply_bulk_field(pool, member_id, request.field, &request.value).await {
            Ok(true) => updated += 1,
            Ok(false) => errors.push(format!("{}: member not found", member_id)),
            Err(BulkFieldError::BadValue(msg)) => errors.push(format!("{}: {}", member_id, msg)),
            Err(BulkFieldError::Db(e)) => return Err(e),
        }
    }

    Ok(BulkUpdateResponse { updated, errors })
}

enum BulkFieldError {
    BadValue(String),
    Db(sqlx::Error),
}

impl From<sqlx::Error> for BulkFieldError {
    fn from(e: sqlx::Error) -> Self {
        BulkFieldError::Db(e)
    }
}

async fn apply_bulk_field(
    pool: &DbPool,
    member_id: &str,
    field: BulkField,
    value: &str,
) -> Result<bool, BulkFieldError> {
    let now = Utc::now();

    let result = match field {
        BulkField::MembershipType => {
            let membership = MembershipType::parse(value).ok_or_else(|| {
                BulkFieldError::BadValue(format!("invalid membership type '{}'", value))
            })?;
            let joined_on = stored_joined_on(pool, member_id).await?;
            let renewal_on = renewal_for(membership, joined_on);
            sqlx::query(
                "UPDATE members SET membership_type = ?, renewal_on = ?, updated_at = ? \
                 WHERE member_id = ?",
            )
            .bind(membership.as_str())
            .bind(renewal_on)
            .bind(now)
            .bind(member_id)
            .execute(pool)
            .await?
        }
        BulkField::JoinedOn => {
            let joined = parse_date(value)?;
            let membership = stored_membership_type(pool, member_id).await?;
            let renewal_on = renewal_for(membership, Some(joined));
            sqlx::query(
                "UPDATE members SET joined_on = ?, renewal_on = ?, updated_at = ? \
                 WHERE member_id = ?",
            )
            .bind(joined)
            .bind(renewal_on)
            .bind(now)
            .bind(member_id)
            .execute(pool)
            .await?
        }
        BulkField::DateOfBirth => {
            let date = parse_date(value)?;
            sqlx::query("UPDATE members SET date_of_birth = ?, updated_at = ? WHERE member_id = ?")
                .bind(date)
                .bind(now)
                .bind(member_id)
                .execute(pool)
                .await?
        }
        // Remaining fields are plain text; the column comes from the
        // BulkField whitelist, never from the request.
        _ => sqlx::query(&format!(
            "UPDATE members SET {} = ?, updated_at = ? WHERE member_id = ?",
            field.column()
        ))
        .bind(value)
        .bind(now)
        .bind(member_id)
        .execute(pool)
        .await?,
    };

    Ok(result.rows_affected() > 0)
}

fn parse_date(value: &str) -> Result<NaiveDate, BulkFieldError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| BulkFieldError::BadValue(format!("invalid date '{}'", value)))
}

async fn stored_joined_on(
    pool: &DbPool,
    member_id: &str,
) -> Result<Option<NaiveDate>, sqlx::Error> {
    let row: Option<(Option<NaiveDate>,)> =
        sqlx::query_as("SELECT joined_on FROM members WHERE member_id = ?")
            .bind(member_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.and_then(|(joined_on,)| joined_on))
}

async fn stored_membership_type(
    pool: &DbPool,
    member_id: &str,
) -> Result<MembershipType, sqlx::Error> {
    let row: Option<(MembershipType,)> =
        sqlx::query_as("SELECT membership_type FROM members WHERE member_id = ?")
            .bind(member_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(membership,)| membership).unwrap_or_default())
}

pub async fn set_password(
    pool: &DbPool,
    member_id: &str,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE members SET password_hash = ?, updated_at = ? WHERE member_id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(member_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_all_passwords(pool: &DbPool, password_hash: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE members SET password_hash = ?, updated_at = ?")
        .bind(password_hash)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Dashboard counters: roster size, distinct members who logged in during
/// the last 7 days, and annual members renewing within 30 days.
pub async fn stats(pool: &DbPool) -> Result<MemberStats, sqlx::Error> {
    let (total_members,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;

    let recent_logins = login_log::recent_success_count(pool, 7).await?;

    let (renewal_soon,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM members \
         WHERE membership_type = 'annual' AND renewal_on IS NOT NULL \
         AND date(renewal_on) BETWEEN date('now') AND date('now', '+30 days')",
    )
    .fetch_one(pool)
    .await?;

    Ok(MemberStats {
        total_members,
        recent_logins,
        renewal_soon,
    })
}

/// Stored image links for the admin link check.
pub async fn image_urls(pool: &DbPool) -> Result<Vec<(String, String)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT member_id, image_url FROM members \
         WHERE image_url IS NOT NULL AND image_url != ''",
    )
    .fetch_all(pool)
    .await
}
