//! Response assembly for catalog outcomes.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | list | 200 | streamed JSON array |
//! | get | 200 | entity |
//! | create / update / upload | 201 + `Location` | entity |
//! | delete | 204 | empty |
//! | not found | 404 | empty |
//! | validation | 400 | [`ValidationErrorBody`] |

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::io;
use utoipa::ToSchema;

use crate::error::ProductResult;
use crate::models::{Category, Product};
use crate::validation::FieldViolation;

pub const PRODUCTS_PATH: &str = "/api/products";
pub const CATEGORIES_PATH: &str = "/api/categories";

/// 400 body listing every violation
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    /// One `"field <name> <message>"` entry per violation
    #[schema(example = json!(["field name must not be empty"]))]
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[schema(example = 400)]
    pub status: u16,
}

/// 201 with a `Location` header and the entity as JSON
#[derive(Debug)]
pub struct Created<T> {
    pub location: String,
    pub body: T,
}

impl Created<Product> {
    pub fn product(product: Product) -> Self {
        Self {
            location: location(PRODUCTS_PATH, product.id.as_deref()),
            body: product,
        }
    }
}

impl Created<Category> {
    pub fn category(category: Category) -> Self {
        Self {
            location: location(CATEGORIES_PATH, category.id.as_deref()),
            body: category,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [(header::LOCATION, self.location)],
            Json(self.body),
        )
            .into_response()
    }
}

fn location(base: &str, id: Option<&str>) -> String {
    format!("{}/{}", base, id.unwrap_or_default())
}

pub fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub fn validation_failure(violations: &[FieldViolation]) -> Response {
    let body = ValidationErrorBody {
        errors: violations.iter().map(ToString::to_string).collect(),
        timestamp: Utc::now(),
        status: StatusCode::BAD_REQUEST.as_u16(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Stream `items` as a JSON array without buffering the whole sequence.
///
/// An item error after the response has started cannot change the status, so
/// it is logged and the body is cut short.
pub fn json_array<T, S>(items: S) -> Response
where
    T: Serialize + Send + 'static,
    S: Stream<Item = ProductResult<T>> + Send + Unpin + 'static,
{
    let body = async_stream::stream! {
        let mut items = items;
        let mut first = true;
        yield Ok::<Bytes, io::Error>(Bytes::from_static(b"["));

        while let Some(item) = items.next().await {
            let encoded = match item {
                Ok(value) => serde_json::to_vec(&value).map_err(io::Error::other),
                Err(e) => Err(io::Error::other(e.to_string())),
            };

            match encoded {
                Ok(json) => {
                    if !first {
                        yield Ok(Bytes::from_static(b","));
                    }
                    first = false;
                    yield Ok(Bytes::from(json));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Listing stream failed, truncating response");
                    yield Err(e);
                    return;
                }
            }
        }

        yield Ok(Bytes::from_static(b"]"));
    };

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(body),
    )
        .into_response()
}
