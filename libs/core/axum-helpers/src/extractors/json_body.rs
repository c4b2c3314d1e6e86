//! JSON extractor whose rejections use the shared error format.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// Like [`axum::Json`], but a missing content type or malformed body is
/// reported as an [`ErrorResponse`](crate::ErrorResponse) instead of plain text.
///
/// Field-level validation is left to the handler or service so each domain
/// can shape its own violation report.
///
/// ```ignore
/// async fn create(JsonBody(payload): JsonBody<ProductPayload>) -> impl IntoResponse { .. }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}
