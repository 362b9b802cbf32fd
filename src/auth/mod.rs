// Authentication module
// JWT issuance/verification and password hashing

pub mod jwt;
pub mod password;
