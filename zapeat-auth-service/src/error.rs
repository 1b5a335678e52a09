use prost::{bytes::Bytes, Message};
use thiserror::Error;
use tonic::{Code, Status};
use tracing::error;
use zapeat_proto::common;

use crate::sms::SmsError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Mobile number must be entered in the format '+999999999'. Up to 15 digits allowed.")]
    InvalidMobileNumber,
    #[error("Invalid or expired verification token")]
    InvalidVerification,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User inactive or deleted")]
    InactiveUser,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{field}: {description}")]
    Validation { field: String, description: String },
    #[error("cannot sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("cannot hash code: {0}")]
    Hashing(String),
    #[error(transparent)]
    Sms(#[from] SmsError),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
    #[error(transparent)]
    Connection(#[from] diesel::ConnectionError),
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidMobileNumber => invalid_field("mobile_number", &err),
            AuthError::Validation { ref field, ref description } => {
                invalid_field(field, description)
            }
            AuthError::InvalidVerification | AuthError::InvalidToken => {
                Status::invalid_argument(err.to_string())
            }
            AuthError::InactiveUser => Status::unauthenticated(err.to_string()),
            AuthError::NotFound(_) => Status::not_found(err.to_string()),
            AuthError::Sms(ref source) => {
                error!(error = %source, "cannot deliver verification code");
                Status::unavailable("Cannot deliver verification code")
            }
            AuthError::Connection(ref source) => {
                error!(error = %source, "cannot connect to database");
                Status::unavailable("Database unavailable")
            }
            AuthError::Signing(_) | AuthError::Hashing(_) | AuthError::Database(_) => {
                error!(error = %err, "auth request failed");
                Status::internal("Internal server error")
            }
        }
    }
}

fn invalid_field(field: &str, description: &impl ToString) -> Status {
    let description = description.to_string();
    let details = common::ValidationErrors {
        violations: vec![common::FieldViolation {
            field: field.to_string(),
            description: description.clone(),
        }],
    };
    Status::with_details(
        Code::InvalidArgument,
        description,
        Bytes::from(details.encode_to_vec()),
    )
}
