pub mod auth;
pub mod members;

pub use auth::*;
pub use members::*;
