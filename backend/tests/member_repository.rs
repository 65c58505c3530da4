mod support;

use chrono::NaiveDate;

use qrpass_backend::{
    models::member::{
        BulkField, BulkUpdateRequest, Member, MemberQuery, MembershipType, UpdateMemberRequest,
    },
    repositories::{login_log, member as member_repo},
    utils::password::hash_password,
};
use support::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed(pool: &qrpass_backend::db::connection::DbPool, member_id: &str, name: &str) -> Member {
    let hash = hash_password("pw").unwrap();
    let member = Member::new(member_payload(member_id, name), hash);
    member_repo::insert(pool, &member).await.unwrap();
    member
}

#[tokio::test]
async fn insert_rejects_duplicate_ids_while_insert_ignore_skips() {
    let pool = test_pool().await;
    let member = seed(&pool, "M-001", "Asha Nair").await;

    let err = member_repo::insert(&pool, &member).await.unwrap_err();
    assert!(member_repo::is_unique_violation(&err));

    let inserted = member_repo::insert_ignore(&pool, &member).await.unwrap();
    assert!(!inserted);

    let mut other = member.clone();
    other.member_id = "M-002".to_string();
    assert!(member_repo::insert_ignore(&pool, &other).await.unwrap());
}

#[tokio::test]
async fn list_combines_search_with_exact_filters() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;
    seed(&pool, "M-002", "Ravi Kumar").await;
    sqlx::query("UPDATE members SET blood_group = 'O+', phone = '555-1234' WHERE member_id = 'M-001'")
        .execute(&pool)
        .await
        .unwrap();

    let query = MemberQuery {
        search: Some("Nair".into()),
        blood_group: Some("O+".into()),
        membership_type: None,
    };
    let members = member_repo::list(&pool, &query).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].member_id, "M-001");

    // Same search but a filter that excludes the hit
    let query = MemberQuery {
        search: Some("Nair".into()),
        blood_group: Some("AB-".into()),
        membership_type: None,
    };
    assert!(member_repo::list(&pool, &query).await.unwrap().is_empty());

    // Results come back ordered by name
    let all = member_repo::list(&pool, &MemberQuery::default()).await.unwrap();
    assert_eq!(all[0].name, "Asha Nair");
    assert_eq!(all[1].name, "Ravi Kumar");
}

#[tokio::test]
async fn update_rewrites_fields_and_renewal() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;

    let payload = UpdateMemberRequest {
        name: "Asha N.".into(),
        date_of_birth: Some(date(1990, 1, 20)),
        address: Some("12 Beach Road".into()),
        blood_group: Some("B+".into()),
        phone: None,
        image_url: None,
        membership_type: MembershipType::Lifetime,
        joined_on: Some(date(2020, 1, 1)),
    };
    assert!(member_repo::update(&pool, "M-001", &payload).await.unwrap());

    let member = member_repo::find_by_id(&pool, "M-001").await.unwrap().unwrap();
    assert_eq!(member.name, "Asha N.");
    assert_eq!(member.renewal_on, Some(date(2099, 12, 31)));

    assert!(!member_repo::update(&pool, "M-404", &payload).await.unwrap());
}

#[tokio::test]
async fn bulk_update_handles_plain_fields_and_membership_changes() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;
    seed(&pool, "M-002", "Ravi Kumar").await;
    sqlx::query("UPDATE members SET joined_on = '2024-02-29' WHERE member_id = 'M-001'")
        .execute(&pool)
        .await
        .unwrap();

    // Plain text field
    let result = member_repo::bulk_update(
        &pool,
        &BulkUpdateRequest {
            member_ids: vec!["M-001".into(), "M-002".into()],
            field: BulkField::BloodGroup,
            value: "AB+".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(result.updated, 2);
    assert!(result.errors.is_empty());

    // Membership flip recomputes renewal from the stored joining date,
    // including the leap-day fallback
    let result = member_repo::bulk_update(
        &pool,
        &BulkUpdateRequest {
            member_ids: vec!["M-001".into()],
            field: BulkField::MembershipType,
            value: "annual".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(result.updated, 1);
    let member = member_repo::find_by_id(&pool, "M-001").await.unwrap().unwrap();
    assert_eq!(member.renewal_on, Some(date(2025, 2, 28)));

    // Joining date change on an annual member moves the renewal
    let result = member_repo::bulk_update(
        &pool,
        &BulkUpdateRequest {
            member_ids: vec!["M-001".into()],
            field: BulkField::JoinedOn,
            value: "2024-07-01".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(result.updated, 1);
    let member = member_repo::find_by_id(&pool, "M-001").await.unwrap().unwrap();
    assert_eq!(member.renewal_on, Some(date(2025, 7, 1)));

    // Invalid tier value is reported per member
    let result = member_repo::bulk_update(
        &pool,
        &BulkUpdateRequest {
            member_ids: vec!["M-002".into()],
            field: BulkField::MembershipType,
            value: "weekly".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(result.updated, 0);
    assert!(result.errors[0].contains("invalid membership type"));
}

#[tokio::test]
async fn delete_is_transactional_over_member_and_logs() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;
    login_log::record_attempt(&pool, "M-001", true).await.unwrap();

    assert!(member_repo::delete(&pool, "M-001").await.unwrap());
    assert!(!member_repo::delete(&pool, "M-001").await.unwrap());

    let (logs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM login_logs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(logs, 0);
}

#[tokio::test]
async fn recent_success_count_is_distinct_and_windowed() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;
    seed(&pool, "M-002", "Ravi Kumar").await;

    login_log::record_attempt(&pool, "M-001", true).await.unwrap();
    login_log::record_attempt(&pool, "M-001", true).await.unwrap();
    login_log::record_attempt(&pool, "M-002", false).await.unwrap();
    sqlx::query(
        "INSERT INTO login_logs (member_id, logged_at, success) \
         VALUES ('M-002', datetime('now', '-8 days'), 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let count = login_log::recent_success_count(&pool, 7).await.unwrap();
    assert_eq!(count, 1);

    // Widening the window picks up the old success
    let count = login_log::recent_success_count(&pool, 30).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn stats_renewal_window_excludes_lifetime_and_faraway_dates() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;
    seed(&pool, "M-002", "Ravi Kumar").await;
    seed(&pool, "M-003", "Meera Pillai").await;

    sqlx::query("UPDATE members SET renewal_on = date('now', '+10 days') WHERE member_id = 'M-001'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE members SET renewal_on = date('now', '+60 days') WHERE member_id = 'M-002'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "UPDATE members SET membership_type = 'lifetime', renewal_on = '2099-12-31' \
         WHERE member_id = 'M-003'",
    )
    .execute(&pool)
    .await
    .unwrap();

    let stats = member_repo::stats(&pool).await.unwrap();
    assert_eq!(stats.total_members, 3);
    assert_eq!(stats.renewal_soon, 1);
}

#[tokio::test]
async fn set_all_passwords_touches_every_row() {
    let pool = test_pool().await;
    seed(&pool, "M-001", "Asha Nair").await;
    seed(&pool, "M-002", "Ravi Kumar").await;

    let hash = hash_password("fresh-default").unwrap();
    let updated = member_repo::set_all_passwords(&pool, &hash).await.unwrap();
    assert_eq!(updated, 2);

    let member = member_repo::find_by_id(&pool, "M-002").await.unwrap().unwrap();
    assert_eq!(member.password_hash, hash);
}
