use prost::{bytes::Bytes, Message};
use thiserror::Error;
use tonic::{Code, Status};
use tracing::error;
use zapeat_proto::common;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub description: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid catalog request ({} violations)", .0.len())]
    Validation(Vec<FieldViolation>),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
    #[error(transparent)]
    Connection(#[from] diesel::ConnectionError),
}

impl CatalogError {
    /// `Ok(())` when nothing was violated.
    pub fn check(violations: Vec<FieldViolation>) -> Result<(), CatalogError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Validation(violations))
        }
    }
}

impl From<CatalogError> for Status {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => Status::not_found(err.to_string()),
            CatalogError::Validation(ref violations) => {
                let details = common::ValidationErrors {
                    violations: violations
                        .iter()
                        .map(|v| common::FieldViolation {
                            field: v.field.clone(),
                            description: v.description.clone(),
                        })
                        .collect(),
                };
                Status::with_details(
                    Code::InvalidArgument,
                    err.to_string(),
                    Bytes::from(details.encode_to_vec()),
                )
            }
            CatalogError::Database(ref source) => {
                error!(error = %source, "catalog query failed");
                Status::internal("Internal server error")
            }
            CatalogError::Connection(ref source) => {
                error!(error = %source, "cannot connect to database");
                Status::unavailable("Database unavailable")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_invalid_argument_with_details() {
        let status = Status::from(CatalogError::Validation(vec![FieldViolation::new(
            "price",
            "Price must not be negative",
        )]));

        assert_eq!(status.code(), Code::InvalidArgument);
        let details = common::ValidationErrors::decode(status.details()).unwrap();
        assert_eq!(details.violations[0].field, "price");
    }

    #[test]
    fn not_found_names_the_entity() {
        let status = Status::from(CatalogError::NotFound("Menu item"));
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "Menu item not found");
    }

    #[test]
    fn empty_violation_list_passes_check() {
        assert!(CatalogError::check(Vec::new()).is_ok());
        assert!(matches!(
            CatalogError::check(vec![FieldViolation::new("name", "Name is required")]),
            Err(CatalogError::Validation(_))
        ));
    }
}
