pub mod cookies;
pub mod csv_import;
pub mod drive;
pub mod password;
pub mod qr;
pub mod tokens;
