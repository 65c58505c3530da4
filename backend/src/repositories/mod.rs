pub mod admin;
pub mod login_log;
pub mod member;
