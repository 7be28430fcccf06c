use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{AppError, ErrorCode};

/// JSON body extractor whose rejections surface as `InvalidInput`.
///
/// Malformed syntax, missing or unknown fields and type mismatches are all
/// reported before a handler touches the store.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::new(ErrorCode::InvalidInput, rejection.body_text())),
        }
    }
}

/// Run `validator` rules and map failures to `InvalidInput`.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::InvalidInput, e.to_string()))
}
