pub mod admin;
pub mod member;
