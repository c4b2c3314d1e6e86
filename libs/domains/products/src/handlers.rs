//! HTTP handlers for the Products and Categories API

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, PayloadTooLargeResponse,
    },
    JsonBody,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::{ProductError, ProductResult};
use crate::models::{Category, CategoryPayload, Product, ProductPayload};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::response::{self, Created, ValidationErrorBody};
use crate::service::ProductService;
use crate::validation::FieldViolation;

/// Multipart part names accepted for the image
const FILE_PARTS: [&str; 2] = ["file", "filePart"];

const MISSING_FILE_PART: &str = "multipart body has no file part";

type SharedService<P, C> = Arc<ProductService<P, C>>;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        upload_image,
        create_with_image,
    ),
    components(
        schemas(Product, Category, ProductPayload, ValidationErrorBody, ImageUpload, ProductImageForm),
        responses(BadRequestResponse, PayloadTooLargeResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for Categories API
#[derive(OpenApi)]
#[openapi(
    paths(list_categories, create_category, get_category),
    components(
        schemas(Category, CategoryPayload, ValidationErrorBody),
        responses(InternalServerErrorResponse)
    ),
    tags(
        (name = "Categories", description = "Category endpoints")
    )
)]
pub struct CategoriesApiDoc;

/// Single image part for `/upload/{id}`
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Text fields followed by the image part for `/v2`
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
struct ProductImageForm {
    name: String,
    price: f64,
    #[serde(rename = "category.id")]
    category_id: Option<String>,
    #[serde(rename = "category.name")]
    category_name: String,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Products router; nest it at `/products`
pub fn router<P, C>(service: ProductService<P, C>) -> Router
where
    P: ProductRepository + 'static,
    C: CategoryRepository + 'static,
{
    let body_limit = service.config().max_upload_bytes;
    let shared_service = Arc::new(service);

    let uploads = Router::new()
        .route("/upload/{id}", post(upload_image))
        .route("/v2", post(create_with_image))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .merge(uploads)
        .with_state(shared_service)
}

/// Categories router; nest it at `/categories`
pub fn categories_router<P, C>(service: ProductService<P, C>) -> Router
where
    P: ProductRepository + 'static,
    C: CategoryRepository + 'static,
{
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", get(get_category))
        .with_state(Arc::new(service))
}

/// List all products
///
/// Streamed as a JSON array while the store produces results.
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
) -> ProductResult<Response> {
    let products = service.list().await?;
    Ok(response::json_array(products))
}

/// Create a product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = Product,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> ProductResult<Created<Product>> {
    let product = service.create(payload).await?;
    Ok(Created::product(product))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.get(&id).await?;
    Ok(Json(product))
}

/// Update name, price and category of a product
///
/// Identifier, creation time and picture are never changed.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID")),
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product updated", body = Product,
            headers(("Location" = String, description = "URL of the product"))),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 404, description = "Product not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> ProductResult<Created<Product>> {
    let product = service.update(&id, payload).await?;
    Ok(Created::product(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    Path(id): Path<String>,
) -> ProductResult<Response> {
    service.delete(&id).await?;
    Ok(response::no_content())
}

/// Upload an image for an existing product
#[utoipa::path(
    post,
    path = "/upload/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID")),
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored and attached", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "Product not found"),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upload_image<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ProductResult<Created<Product>> {
    while let Some(field) = multipart.next_field().await? {
        if !is_file_part(field.name()) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let product = service.upload_image(&id, &filename, field).await?;
        return Ok(Created::product(product));
    }

    Err(ProductError::BadRequest(MISSING_FILE_PART.to_string()))
}

/// Create a product together with its image
///
/// Text fields must come before the file part.
#[utoipa::path(
    post,
    path = "/v2",
    tag = "Products",
    request_body(content = ProductImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created with image", body = Product),
        (status = 400, description = "Validation failed or malformed form", body = ValidationErrorBody),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_with_image<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    mut multipart: Multipart,
) -> ProductResult<Created<Product>> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if is_file_part(Some(&name)) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let payload = form.into_payload()?;
            let product = service.create_with_image(payload, &filename, field).await?;
            return Ok(Created::product(product));
        }

        let value = field.text().await?;
        form.set(&name, value);
    }

    Err(ProductError::BadRequest(MISSING_FILE_PART.to_string()))
}

fn is_file_part(name: Option<&str>) -> bool {
    name.is_some_and(|n| FILE_PARTS.contains(&n))
}

/// Text fields collected from a `/v2` submission
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    price: Option<String>,
    category_id: Option<String>,
    category_name: Option<String>,
}

impl ProductForm {
    fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = Some(value),
            "price" => self.price = Some(value),
            "category.id" => self.category_id = Some(value),
            "category.name" => self.category_name = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    fn into_payload(self) -> ProductResult<ProductPayload> {
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(price) if price.is_finite() => Some(price),
                _ => {
                    return Err(ProductError::Validation(vec![FieldViolation::new(
                        "price",
                        "must be a number",
                    )]))
                }
            },
        };

        let category = match (self.category_id, self.category_name) {
            (None, None) => None,
            (id, name) => Some(Category {
                id: id.filter(|id| !id.is_empty()),
                name: name.unwrap_or_default(),
            }),
        };

        Ok(ProductPayload {
            name: self.name,
            price,
            category,
            created_at: None,
        })
    }
}

/// List all categories
#[utoipa::path(
    get,
    path = "",
    tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
) -> ProductResult<Response> {
    let categories = service.list_categories().await?;
    Ok(response::json_array(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    JsonBody(payload): JsonBody<CategoryPayload>,
) -> ProductResult<Created<Category>> {
    let category = service.create_category(payload).await?;
    Ok(Created::category(category))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<P: ProductRepository, C: CategoryRepository>(
    State(service): State<SharedService<P, C>>,
    Path(id): Path<String>,
) -> ProductResult<impl IntoResponse> {
    let category = service.get_category(&id).await?;
    Ok(Json(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_part_names() {
        assert!(is_file_part(Some("file")));
        assert!(is_file_part(Some("filePart")));
        assert!(!is_file_part(Some("name")));
        assert!(!is_file_part(None));
    }

    #[test]
    fn test_form_builds_payload() {
        let mut form = ProductForm::default();
        form.set("name", "TV".to_string());
        form.set("price", " 250.5 ".to_string());
        form.set("category.id", "c1".to_string());
        form.set("category.name", "Electronic".to_string());
        form.set("color", "black".to_string());

        let payload = form.into_payload().unwrap();
        assert_eq!(payload.name.as_deref(), Some("TV"));
        assert_eq!(payload.price, Some(250.5));
        let category = payload.category.unwrap();
        assert_eq!(category.id.as_deref(), Some("c1"));
        assert_eq!(category.name, "Electronic");
    }

    #[test]
    fn test_form_rejects_non_numeric_price() {
        let mut form = ProductForm::default();
        form.set("price", "cheap".to_string());

        let err = form.into_payload().unwrap_err();
        assert!(matches!(err, ProductError::Validation(v) if v[0].field == "price"));
    }

    #[test]
    fn test_form_rejects_non_finite_price() {
        for raw in ["inf", "-Infinity", "NaN"] {
            let mut form = ProductForm::default();
            form.set("price", raw.to_string());

            let err = form.into_payload().unwrap_err();
            assert!(
                matches!(&err, ProductError::Validation(v) if v[0].message == "must be a number"),
                "{} should be rejected, got {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_form_without_category_fields_has_no_category() {
        let mut form = ProductForm::default();
        form.set("name", "TV".to_string());

        let payload = form.into_payload().unwrap();
        assert!(payload.category.is_none());
        assert!(payload.price.is_none());
    }
}
