pub mod config;
pub mod error;
pub mod models;
pub mod otp;
pub mod rpc;
pub mod schema;
pub mod sms;
pub mod tokens;
