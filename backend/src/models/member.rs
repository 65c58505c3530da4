//! Models for roster members, their membership terms, and the API payloads
//! that create, update, and present them.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Renewal date stored for lifetime memberships.
pub const LIFETIME_RENEWAL: &str = "2099-12-31";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a roster member.
pub struct Member {
    /// Externally assigned roster identifier, printed on membership cards.
    pub member_id: String,
    /// Member's full name.
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    /// Contact phone number (the roster tracked WhatsApp numbers).
    pub phone: Option<String>,
    /// Share link to the member's photo, usually a Google Drive URL.
    pub image_url: Option<String>,
    pub membership_type: MembershipType,
    pub joined_on: Option<NaiveDate>,
    /// Derived from `membership_type` and `joined_on`; see [`renewal_for`].
    pub renewal_on: Option<NaiveDate>,
    /// Argon2 hash of the member's password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Membership tiers stored in the database.
pub enum MembershipType {
    /// Renewed one year after the joining date.
    #[default]
    Annual,
    /// Never expires; renewal pinned far in the future.
    Lifetime,
}

impl MembershipType {
    /// Returns the canonical snake_case representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Annual => "annual",
            MembershipType::Lifetime => "lifetime",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "annual" => Some(MembershipType::Annual),
            "lifetime" => Some(MembershipType::Lifetime),
            // legacy roster exports spelled the annual tier out
            "annually" => Some(MembershipType::Annual),
            _ => None,
        }
    }
}

impl Serialize for MembershipType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MembershipType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MembershipType::parse(&s)
            .ok_or_else(|| serde::de::Error::unknown_variant(&s, &["annual", "lifetime"]))
    }
}

/// Computes the renewal date for a membership. Lifetime members get the fixed
/// far-future date; annual members renew one year after joining. Returns
/// `None` when an annual member has no recorded joining date.
pub fn renewal_for(
    membership_type: MembershipType,
    joined_on: Option<NaiveDate>,
) -> Option<NaiveDate> {
    match membership_type {
        MembershipType::Lifetime => NaiveDate::parse_from_str(LIFETIME_RENEWAL, "%Y-%m-%d").ok(),
        MembershipType::Annual => joined_on.and_then(|joined| {
            joined
                .with_year(joined.year() + 1)
                // Feb 29 joiners renew on Feb 28
                .or_else(|| NaiveDate::from_ymd_opt(joined.year() + 1, 2, 28))
        }),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Payload for creating a new member.
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 64))]
    pub member_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub membership_type: MembershipType,
    pub joined_on: Option<NaiveDate>,
    /// Initial password; the configured default is used when omitted.
    #[validate(length(min = 4))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Payload for editing an existing member. Every field is written; the
/// renewal date is recomputed from the submitted membership data.
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub membership_type: MembershipType,
    pub joined_on: Option<NaiveDate>,
}

/// Fields that may be targeted by a bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkField {
    Name,
    DateOfBirth,
    Address,
    BloodGroup,
    Phone,
    ImageUrl,
    MembershipType,
    JoinedOn,
}

impl BulkField {
    pub fn column(&self) -> &'static str {
        match self {
            BulkField::Name => "name",
            BulkField::DateOfBirth => "date_of_birth",
            BulkField::Address => "address",
            BulkField::BloodGroup => "blood_group",
            BulkField::Phone => "phone",
            BulkField::ImageUrl => "image_url",
            BulkField::MembershipType => "membership_type",
            BulkField::JoinedOn => "joined_on",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Sets one field to the same value on many members at once.
pub struct BulkUpdateRequest {
    #[validate(length(min = 1))]
    pub member_ids: Vec<String>,
    pub field: BulkField,
    #[validate(length(min = 1))]
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkUpdateResponse {
    pub updated: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
/// Search and filter parameters for roster listings and QR batches.
pub struct MemberQuery {
    /// Substring match against name, member id, or phone.
    pub search: Option<String>,
    /// Exact blood group filter.
    pub blood_group: Option<String>,
    /// Exact membership tier filter.
    pub membership_type: Option<MembershipType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Roster entry as returned by the API. Never carries the password hash.
pub struct MemberResponse {
    pub member_id: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub membership_type: MembershipType,
    pub joined_on: Option<NaiveDate>,
    pub renewal_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        MemberResponse {
            member_id: member.member_id,
            name: member.name,
            date_of_birth: member.date_of_birth,
            address: member.address,
            blood_group: member.blood_group,
            phone: member.phone,
            image_url: member.image_url,
            membership_type: member.membership_type,
            joined_on: member.joined_on,
            renewal_on: member.renewal_on,
            created_at: member.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Full profile view: member data plus the QR login material and the
/// normalized photo URL.
pub struct ProfileResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    /// Photo link rewritten to a directly loadable thumbnail URL.
    pub photo_url: Option<String>,
    pub qr_svg: String,
    pub login_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// One entry of an admin QR batch.
pub struct MemberQrCode {
    pub member_id: String,
    pub name: String,
    pub qr_svg: String,
    pub login_url: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
/// Dashboard statistics.
pub struct MemberStats {
    pub total_members: i64,
    /// Distinct members with a successful login in the last 7 days.
    pub recent_logins: i64,
    /// Annual members whose renewal falls within the next 30 days.
    pub renewal_soon: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Credentials submitted by a member attempting to authenticate.
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub member_id: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// QR-code login: the signed token stands in for the member id.
pub struct QrLoginRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Minimal identity shown on a login screen before authentication.
pub struct LoginTargetResponse {
    pub member_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Body returned after a successful member login (the session itself rides
/// in the cookie).
pub struct LoginResponse {
    pub member: MemberResponse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Payload submitted when a member changes their own password.
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Admin reset of a single member password.
pub struct ResetPasswordRequest {
    #[validate(length(min = 4))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Admin reset of every member password to one default.
pub struct BulkResetPasswordRequest {
    #[validate(length(min = 4))]
    pub default_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Result of probing stored image links.
pub struct ImageCheckResponse {
    pub checked: usize,
    pub reachable: usize,
    pub unreachable: Vec<String>,
}

impl Member {
    /// Constructs a member row from a creation payload and password hash.
    pub fn new(payload: CreateMemberRequest, password_hash: String) -> Self {
        let now = Utc::now();
        let renewal_on = renewal_for(payload.membership_type, payload.joined_on);
        Self {
            member_id: payload.member_id,
            name: payload.name,
            date_of_birth: payload.date_of_birth,
            address: payload.address,
            blood_group: payload.blood_group,
            phone: payload.phone,
            image_url: payload.image_url,
            membership_type: payload.membership_type,
            joined_on: payload.joined_on,
            renewal_on,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn membership_type_serde_accepts_legacy_spelling() {
        let annual: MembershipType = serde_json::from_str("\"annual\"").unwrap();
        let lifetime: MembershipType = serde_json::from_str("\"lifetime\"").unwrap();
        assert_eq!(annual, MembershipType::Annual);
        assert_eq!(lifetime, MembershipType::Lifetime);

        // Tolerate the spelling used by old roster exports
        let legacy: MembershipType = serde_json::from_str("\"annually\"").unwrap();
        assert_eq!(legacy, MembershipType::Annual);

        let bad: Result<MembershipType, _> = serde_json::from_str("\"weekly\"");
        assert!(bad.is_err());

        assert_eq!(
            serde_json::to_value(MembershipType::Annual).unwrap(),
            serde_json::Value::String("annual".into())
        );
    }

    #[test]
    fn renewal_for_lifetime_is_pinned() {
        let renewal = renewal_for(MembershipType::Lifetime, None).unwrap();
        assert_eq!(renewal, date(2099, 12, 31));

        // Joining date is irrelevant for lifetime members
        let renewal = renewal_for(MembershipType::Lifetime, Some(date(2020, 5, 1))).unwrap();
        assert_eq!(renewal, date(2099, 12, 31));
    }

    #[test]
    fn renewal_for_annual_adds_one_year() {
        let renewal = renewal_for(MembershipType::Annual, Some(date(2024, 3, 15)));
        assert_eq!(renewal, Some(date(2025, 3, 15)));
    }

    #[test]
    fn renewal_for_annual_without_joining_date_is_none() {
        assert_eq!(renewal_for(MembershipType::Annual, None), None);
    }

    #[test]
    fn renewal_for_leap_day_falls_back_to_feb_28() {
        let renewal = renewal_for(MembershipType::Annual, Some(date(2024, 2, 29)));
        assert_eq!(renewal, Some(date(2025, 2, 28)));
    }

    #[test]
    fn member_new_derives_renewal_and_hides_nothing_it_should_keep() {
        let payload = CreateMemberRequest {
            member_id: "M-100".into(),
            name: "Asha Nair".into(),
            date_of_birth: Some(date(1990, 1, 20)),
            address: None,
            blood_group: Some("O+".into()),
            phone: Some("9876543210".into()),
            image_url: None,
            membership_type: MembershipType::Annual,
            joined_on: Some(date(2024, 6, 1)),
            password: None,
        };
        let member = Member::new(payload, "hash".into());
        assert_eq!(member.renewal_on, Some(date(2025, 6, 1)));
        assert_eq!(member.member_id, "M-100");

        let response = MemberResponse::from(member);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["blood_group"], "O+");
    }

    #[test]
    fn bulk_field_maps_to_whitelisted_columns_only() {
        assert_eq!(BulkField::BloodGroup.column(), "blood_group");
        assert_eq!(BulkField::MembershipType.column(), "membership_type");
        // Unknown fields never deserialize, so no column can be injected
        let bad: Result<BulkField, _> = serde_json::from_str("\"password_hash\"");
        assert!(bad.is_err());
    }
}
