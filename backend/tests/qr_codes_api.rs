mod support;

use axum::http::StatusCode;

use qrpass_backend::utils::tokens::verify_qr_token;
use support::*;

#[tokio::test]
async fn qr_batch_is_admin_only() {
    let (app, state) = test_app().await;
    seed_member(&state, "M-001", "Asha Nair", "pw123456").await;

    let response = send_json(&app, "GET", "/api/admin/members/qr-codes", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let member_cookie = login_member(&app, "M-001", "pw123456").await;
    let response = send_json(
        &app,
        "GET",
        "/api/admin/members/qr-codes",
        None,
        Some(&member_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn qr_batch_returns_verifiable_login_urls() {
    let (app, state) = test_app().await;
    let cookie = login_admin(&app).await;
    seed_member(&state, "M-001", "Asha Nair", "pw").await;
    seed_member(&state, "M-002", "Ravi Kumar", "pw").await;

    let response = send_json(&app, "GET", "/api/admin/members/qr-codes", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let codes = body.as_array().unwrap();
    assert_eq!(codes.len(), 2);

    for code in codes {
        assert!(code["qr_svg"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));

        // The URL's trailing segment is a token naming this member
        let login_url = code["login_url"].as_str().unwrap();
        let token = login_url.rsplit('/').next().unwrap();
        let member_id = verify_qr_token(token, TEST_QR_SECRET).expect("token verifies");
        assert_eq!(member_id, code["member_id"].as_str().unwrap());
    }
}

#[tokio::test]
async fn qr_batch_honors_roster_filters() {
    let (app, state) = test_app().await;
    let cookie = login_admin(&app).await;
    seed_member(&state, "M-001", "Asha Nair", "pw").await;
    seed_member(&state, "M-002", "Ravi Kumar", "pw").await;
    sqlx::query("UPDATE members SET membership_type = 'lifetime' WHERE member_id = 'M-002'")
        .execute(&state.pool)
        .await
        .unwrap();

    let response = send_json(
        &app,
        "GET",
        "/api/admin/members/qr-codes?membership_type=lifetime",
        None,
        Some(&cookie),
    )
    .await;
    let body = response_json(response).await;
    let codes = body.as_array().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0]["member_id"], "M-002");

    let response = send_json(
        &app,
        "GET",
        "/api/admin/members/qr-codes?search=nobody",
        None,
        Some(&cookie),
    )
    .await;
    let body = response_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}
