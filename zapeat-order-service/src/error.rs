use prost::{bytes::Bytes, Message};
use thiserror::Error;
use tonic::{Code, Status};
use tracing::error;
use zapeat_proto::common;

use crate::{models::OrderStatus, repository::RepositoryError};

/// A rejected input field, addressed by its path in the request (`items[2].quantity`).
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
pub enum OrderError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid order request ({} violations)", .0.len())]
    Validation(Vec<FieldViolation>),
    #[error("Invalid current status {current:?}")]
    InvalidState { current: OrderStatus },
    #[error("Unexpected internal error")]
    Internal(#[from] RepositoryError),
}

impl OrderError {
    pub fn violation(field: impl Into<String>, description: impl Into<String>) -> Self {
        OrderError::Validation(vec![FieldViolation::new(field, description)])
    }
}

impl From<OrderError> for Status {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) => Status::not_found(err.to_string()),
            OrderError::Validation(ref violations) => {
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
            OrderError::InvalidState { .. } => Status::failed_precondition(err.to_string()),
            OrderError::Internal(ref source) => {
                error!(error = %source, "order persistence failed");
                Status::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field_details() {
        let err = OrderError::Validation(vec![
            FieldViolation::new("items[0].quantity", "Quantity must be a positive integer"),
            FieldViolation::new("items[1].menu_item_id", "Menu item does not exist"),
        ]);
        let status = Status::from(err);

        assert_eq!(status.code(), Code::InvalidArgument);
        let details = common::ValidationErrors::decode(status.details()).unwrap();
        assert_eq!(details.violations.len(), 2);
        assert_eq!(details.violations[0].field, "items[0].quantity");
        assert_eq!(details.violations[1].field, "items[1].menu_item_id");
    }

    #[test]
    fn not_found_and_invalid_state_map_to_status_codes() {
        assert_eq!(
            Status::from(OrderError::NotFound("Restaurant")).code(),
            Code::NotFound
        );
        assert_eq!(
            Status::from(OrderError::InvalidState {
                current: OrderStatus::Cancelled
            })
            .code(),
            Code::FailedPrecondition
        );
    }
}
