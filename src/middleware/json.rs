use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// [`axum::Json`] whose rejections render as [`ApiError`] bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::invalid_json(format!("Invalid request data format: {}", err.body_text()))
            }
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::invalid_json(format!("Invalid JSON syntax in request body: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::invalid_json("Request must have Content-Type header set to 'application/json'")
            }
            JsonRejection::BytesRejection(err) => {
                ApiError::bad_request(format!("Failed to read request body: {}", err.body_text()))
            }
            other => ApiError::bad_request(other.body_text()),
        }
    }
}
