//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn not_nil(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        let mut err = ValidationError::new("nil_id");
        err.message = Some("Must not be the nil UUID".into());
        return Err(err);
    }
    Ok(())
}

/// Add product to cart request
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductRequest {
    #[validate(custom(function = "not_nil"))]
    pub product_id: Uuid,
}

/// Add bundle to cart request
#[derive(Debug, Deserialize, Validate)]
pub struct AddBundleRequest {
    #[validate(custom(function = "not_nil"))]
    pub bundle_id: Uuid,
}

/// Payment provider callback
#[derive(Debug, Deserialize, Validate)]
pub struct CompletePaymentRequest {
    pub succeeded: bool,

    #[validate(length(min = 1, max = 255, message = "Provider reference must be 1-255 characters"))]
    pub provider_reference: Option<String>,
}
