#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::admin::members::ImportResponse,
    models::{
        admin::{AdminLoginRequest, AdminResponse},
        member::{
            BulkField, BulkResetPasswordRequest, BulkUpdateRequest, BulkUpdateResponse,
            ChangePasswordRequest, CreateMemberRequest, ImageCheckResponse, LoginRequest,
            LoginResponse, LoginTargetResponse, MemberQrCode, MemberQuery, MemberResponse,
            MemberStats, MembershipType, ProfileResponse, QrLoginRequest, ResetPasswordRequest,
            UpdateMemberRequest,
        },
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        qr_login_doc,
        login_target_doc,
        qr_resolve_doc,
        logout_doc,
        change_password_doc,
        me_doc,
        admin_login_doc,
        admin_logout_doc,
        admin_stats_doc,
        admin_list_members_doc,
        admin_create_member_doc,
        admin_view_member_doc,
        admin_update_member_doc,
        admin_delete_member_doc,
        admin_bulk_update_doc,
        admin_reset_password_doc,
        admin_bulk_reset_passwords_doc,
        admin_import_members_doc,
        admin_qr_codes_doc,
        admin_check_images_doc
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            QrLoginRequest,
            LoginResponse,
            LoginTargetResponse,
            ChangePasswordRequest,
            AdminLoginRequest,
            AdminResponse,
            // members
            MemberResponse,
            ProfileResponse,
            CreateMemberRequest,
            UpdateMemberRequest,
            MembershipType,
            MemberQuery,
            // admin operations
            MemberStats,
            BulkField,
            BulkUpdateRequest,
            BulkUpdateResponse,
            ResetPasswordRequest,
            BulkResetPasswordRequest,
            ImportResponse,
            MemberQrCode,
            ImageCheckResponse
        )
    ),
    tags(
        (name = "Auth", description = "Member and admin sessions"),
        (name = "Members", description = "Member-facing profile"),
        (name = "Admin", description = "Roster management")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid password"),
        (status = 404, description = "Unknown member")
    ),
    tag = "Auth"
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/qr-login",
    request_body = QrLoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 403, description = "Invalid or expired QR code")
    ),
    tag = "Auth"
)]
fn qr_login_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/login-target/{member_id}",
    params(("member_id" = String, Path, description = "Roster id")),
    responses((status = 200, description = "Login screen identity", body = LoginTargetResponse)),
    tag = "Auth"
)]
fn login_target_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/qr/{token}",
    params(("token" = String, Path, description = "Signed QR token")),
    responses(
        (status = 200, description = "Token resolved", body = LoginTargetResponse),
        (status = 403, description = "Invalid or expired QR code")
    ),
    tag = "Auth"
)]
fn qr_resolve_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, session revoked"),
        (status = 401, description = "Current password incorrect")
    ),
    tag = "Auth"
)]
fn change_password_doc() {}

#[utoipa::path(
    get,
    path = "/api/members/me",
    responses((status = 200, description = "Own profile with QR material", body = ProfileResponse)),
    tag = "Members"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin session opened", body = AdminResponse),
        (status = 401, description = "Invalid admin credentials")
    ),
    tag = "Auth"
)]
fn admin_login_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    responses((status = 200, description = "Admin session cookie cleared")),
    tag = "Auth"
)]
fn admin_logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses((status = 200, description = "Dashboard counters", body = MemberStats)),
    tag = "Admin"
)]
fn admin_stats_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/members",
    params(MemberQuery),
    responses((status = 200, description = "Roster listing", body = [MemberResponse])),
    tag = "Admin"
)]
fn admin_list_members_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/members",
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member created", body = MemberResponse),
        (status = 409, description = "Member ID already exists")
    ),
    tag = "Admin"
)]
fn admin_create_member_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/members/{member_id}",
    params(("member_id" = String, Path, description = "Roster id")),
    responses((status = 200, description = "Profile with QR material", body = ProfileResponse)),
    tag = "Admin"
)]
fn admin_view_member_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/members/{member_id}",
    params(("member_id" = String, Path, description = "Roster id")),
    request_body = UpdateMemberRequest,
    responses((status = 200, description = "Member updated")),
    tag = "Admin"
)]
fn admin_update_member_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/members/{member_id}",
    params(("member_id" = String, Path, description = "Roster id")),
    responses((status = 200, description = "Member and their login logs deleted")),
    tag = "Admin"
)]
fn admin_delete_member_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/members/bulk-update",
    request_body = BulkUpdateRequest,
    responses((status = 200, description = "Per-member results", body = BulkUpdateResponse)),
    tag = "Admin"
)]
fn admin_bulk_update_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/members/{member_id}/reset-password",
    params(("member_id" = String, Path, description = "Roster id")),
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Password reset")),
    tag = "Admin"
)]
fn admin_reset_password_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/members/reset-passwords",
    request_body = BulkResetPasswordRequest,
    responses((status = 200, description = "Every member password reset")),
    tag = "Admin"
)]
fn admin_bulk_reset_passwords_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/members/import",
    responses((status = 200, description = "Import counts and row errors", body = ImportResponse)),
    tag = "Admin"
)]
fn admin_import_members_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/members/qr-codes",
    params(MemberQuery),
    responses((status = 200, description = "Printable QR batch", body = [MemberQrCode])),
    tag = "Admin"
)]
fn admin_qr_codes_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/members/check-images",
    responses((status = 200, description = "Image link probe results", body = ImageCheckResponse)),
    tag = "Admin"
)]
fn admin_check_images_doc() {}
