//! Signed tokens: short-lived session JWTs for members and admins, and
//! long-lived QR login tokens. The two kinds are signed with different
//! secrets and carry distinct claim sets, so one can never be replayed as
//! the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker value for the QR token `purpose` claim.
const QR_PURPOSE: &str = "qr-login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Member,
    Admin,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Member => "member",
            PrincipalKind::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Member id or admin username.
    pub sub: String,
    pub kind: PrincipalKind,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl SessionClaims {
    pub fn new(subject: String, kind: PrincipalKind, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: subject,
            kind,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct QrClaims {
    sub: String,
    purpose: String,
    exp: i64,
    iat: i64,
}

pub fn create_session_token(
    subject: String,
    kind: PrincipalKind,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    let claims = SessionClaims::new(subject, kind, expiration_hours);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_session_token(token: &str, secret: &str) -> anyhow::Result<SessionClaims> {
    let validation = Validation::default();
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Issues the token embedded in a member's QR code. Printed cards stay in
/// circulation for a long time, so the expiry is measured in days and comes
/// from configuration.
pub fn create_qr_token(
    member_id: &str,
    secret: &str,
    expiration_days: u64,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = QrClaims {
        sub: member_id.to_string(),
        purpose: QR_PURPOSE.to_string(),
        exp: (now + Duration::days(expiration_days as i64)).timestamp(),
        iat: now.timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Verifies a QR token and returns the member id it names.
pub fn verify_qr_token(token: &str, secret: &str) -> anyhow::Result<String> {
    let validation = Validation::default();
    let token_data = decode::<QrClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    if token_data.claims.purpose != QR_PURPOSE {
        anyhow::bail!("Token purpose mismatch");
    }

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_roundtrip_keeps_subject_and_kind() {
        let token = create_session_token("M-001".into(), PrincipalKind::Member, "secret", 1)
            .expect("create token");
        let claims = verify_session_token(&token, "secret").expect("verify token");
        assert_eq!(claims.sub, "M-001");
        assert_eq!(claims.kind, PrincipalKind::Member);
    }

    #[test]
    fn session_tokens_have_unique_jti() {
        let a = create_session_token("M-001".into(), PrincipalKind::Member, "secret", 1).unwrap();
        let b = create_session_token("M-001".into(), PrincipalKind::Member, "secret", 1).unwrap();
        let ca = verify_session_token(&a, "secret").unwrap();
        let cb = verify_session_token(&b, "secret").unwrap();
        assert_ne!(ca.jti, cb.jti);
    }

    #[test]
    fn qr_token_roundtrip_returns_member_id() {
        let token = create_qr_token("M-042", "qr-secret", 365).expect("create token");
        let member_id = verify_qr_token(&token, "qr-secret").expect("verify token");
        assert_eq!(member_id, "M-042");
    }

    #[test]
    fn qr_token_rejects_wrong_secret() {
        let token = create_qr_token("M-042", "qr-secret", 365).unwrap();
        assert!(verify_qr_token(&token, "other-secret").is_err());
    }

    #[test]
    fn session_token_is_not_a_qr_token() {
        // Same signing algorithm, but the purpose claim is absent
        let session =
            create_session_token("M-042".into(), PrincipalKind::Member, "same-secret", 1).unwrap();
        assert!(verify_qr_token(&session, "same-secret").is_err());
    }

    #[test]
    fn expired_session_token_fails_verification() {
        let expired = SessionClaims {
            sub: "M-001".into(),
            kind: PrincipalKind::Member,
            exp: Utc::now().timestamp() - 3600,
            iat: Utc::now().timestamp() - 7200,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &expired,
            &EncodingKey::from_secret("secret".as_ref()),
        )
        .expect("encode token");

        assert!(verify_session_token(&token, "secret").is_err());
    }

    #[test]
    fn malformed_token_fails() {
        assert!(verify_session_token("invalid.token.here", "secret").is_err());
        assert!(verify_qr_token("invalid.token.here", "secret").is_err());
    }
}
