//! Session authentication. Tokens are accepted from the session cookie or
//! an `Authorization: Bearer` header; the resolved principal is stored in
//! the request extensions for handlers to pick up.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    models::{admin::Admin, member::Member},
    repositories::{admin as admin_repo, member as member_repo},
    state::AppState,
    utils::{
        cookies::{extract_cookie_value, SESSION_COOKIE_NAME},
        tokens::{verify_session_token, PrincipalKind, SessionClaims},
    },
};

/// Requires a member session and loads the member row.
pub async fn member_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = session_claims(&request, &state)?;
    if claims.kind != PrincipalKind::Member {
        return Err(StatusCode::FORBIDDEN);
    }

    let member = member_repo::find_by_id(&state.pool, &claims.sub)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(member);
    Ok(next.run(request).await)
}

/// Requires an admin session and loads the admin row.
pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = session_claims(&request, &state)?;
    if claims.kind != PrincipalKind::Admin {
        return Err(StatusCode::FORBIDDEN);
    }

    let admin = admin_repo::find_by_username(&state.pool, &claims.sub)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

fn session_claims(request: &Request, state: &AppState) -> Result<SessionClaims, StatusCode> {
    let headers = request.headers();

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
        })
        .ok_or(StatusCode::UNAUTHORIZED)?;

    verify_session_token(&token, &state.config.session_secret)
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}
