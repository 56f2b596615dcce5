use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// JSON body extractor that treats a missing body as an empty request.
///
/// Routes validate their own required fields, so an absent or `null` body
/// yields `T::default()` and the route answers with its usual 400 message.
/// Content-Type is not enforced.
#[derive(Debug, Clone, Default)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Unable to read request body: {}", e)))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload(T::default()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;
        if value.is_null() {
            return Ok(Payload(T::default()));
        }

        serde_json::from_value(value)
            .map(Payload)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
    }
}
