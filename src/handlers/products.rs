//! Product CRUD handlers with multipart image ingestion.
//!
//! Mutations arrive as `multipart/form-data`: text fields carry the
//! product attributes and the `images` field carries up to 4 files.
//! Accepted files are streamed to the external media host and the
//! returned URLs are substituted into the document before persistence.
//! On update, a newly supplied image set fully replaces the prior set.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::media::{MAX_IMAGES_PER_PRODUCT, MAX_IMAGE_BYTES};
use crate::store::store::now_rfc3339;
use crate::store::ProductRecord;
use crate::AppState;

/// One accepted image file from a multipart payload.
struct ImageUpload {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// Text fields and image files parsed from a product form.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    category: Option<String>,
    images: Vec<ImageUpload>,
}

/// Drain a multipart payload into a [`ProductForm`], enforcing the
/// image constraints (count, size, content type) as fields stream in.
async fn parse_product_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("images") => {
                if form.images.len() == MAX_IMAGES_PER_PRODUCT {
                    return Err(ApiError::bad_request(format!(
                        "At most {MAX_IMAGES_PER_PRODUCT} images are allowed"
                    )));
                }

                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !content_type.starts_with("image/") {
                    return Err(ApiError::UnsupportedMediaType {
                        message: "Only image files are allowed".to_string(),
                    });
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Failed to read uploaded file"))?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::UnsupportedMediaType {
                        message: "Each image must be 5MB or smaller".to_string(),
                    });
                }

                form.images.push(ImageUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some(name) => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
                match name {
                    "name" => form.name = Some(value),
                    "description" => form.description = Some(value),
                    "price" => form.price = Some(value),
                    "stock" => form.stock = Some(value),
                    "category" => form.category = Some(value),
                    _ => {}
                }
            }
            None => {}
        }
    }

    Ok(form)
}

fn parse_price(raw: &str) -> Result<f64, ApiError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Price must be a non-negative number"))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("Price must be a non-negative number"));
    }
    Ok(price)
}

fn parse_stock(raw: &str) -> Result<i64, ApiError> {
    let stock: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Stock must be a non-negative integer"))?;
    if stock < 0 {
        return Err(ApiError::bad_request("Stock must be a non-negative integer"));
    }
    Ok(stock)
}

/// Upload every accepted image to the media host, collecting the
/// public URLs in order.  Any provider failure aborts the request.
async fn upload_images(
    state: &AppState,
    images: &[ImageUpload],
) -> Result<Vec<String>, ApiError> {
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        let url = state
            .media
            .upload(&image.file_name, &image.content_type, image.data.clone())
            .await
            .map_err(|e| {
                tracing::warn!("image upload failed: {e:#}");
                ApiError::ServiceUnavailable {
                    message: "Failed to upload image. Please try again.".to_string(),
                }
            })?;
        urls.push(url);
    }
    Ok(urls)
}

/// `GET /api/products` -- List all products, newest first.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    operation_id = "ListProducts",
    responses((status = 200, description = "Product list"))
)]
pub async fn list_products(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let products = state.store.list_products().await?;
    Ok(Json(products).into_response())
}

/// `GET /api/products/{id}` -- Fetch a single product.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    operation_id = "GetProduct",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such product")
    )
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    super::validate_id(&id)?;
    let product = state
        .store
        .get_product(&id)
        .await?
        .ok_or(ApiError::NotFound { resource: "Product" })?;
    Ok(Json(product).into_response())
}

/// `POST /api/products` -- Create a product from a multipart form.
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    operation_id = "CreateProduct",
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Missing fields or no images"),
        (status = 415, description = "A non-image or oversize file was uploaded"),
        (status = 503, description = "Media host failure")
    )
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = parse_product_form(multipart).await?;

    let (Some(name), Some(description), Some(category)) = (
        super::supplied(&form.name),
        super::supplied(&form.description),
        super::supplied(&form.category),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };
    let (Some(raw_price), Some(raw_stock)) =
        (super::supplied(&form.price), super::supplied(&form.stock))
    else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    let price = parse_price(raw_price)?;
    let stock = parse_stock(raw_stock)?;

    if form.images.is_empty() {
        return Err(ApiError::bad_request("At least one image is required"));
    }

    let images = upload_images(&state, &form.images).await?;

    let now = now_rfc3339();
    let product = ProductRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        stock,
        category: category.to_string(),
        images,
        created_at: now.clone(),
        updated_at: now,
    };
    state.store.insert_product(product.clone()).await?;

    info!("product {} created ({})", product.id, product.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product uploaded successfully",
            "product": product,
        })),
    )
        .into_response())
}

/// `PUT /api/products/{id}` -- Partially update a product.
///
/// Fields absent from the form (or blank strings) keep their prior
/// values; supplied numeric fields are applied even when `0`.  A new
/// image set replaces the old one wholesale.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    operation_id = "UpdateProduct",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Malformed id or invalid field"),
        (status = 404, description = "No such product"),
        (status = 415, description = "A non-image or oversize file was uploaded"),
        (status = 503, description = "Media host failure")
    )
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    super::validate_id(&id)?;

    let form = parse_product_form(multipart).await?;

    let mut product = state
        .store
        .get_product(&id)
        .await?
        .ok_or(ApiError::NotFound { resource: "Product" })?;

    if let Some(name) = super::supplied(&form.name) {
        product.name = name.to_string();
    }
    if let Some(description) = super::supplied(&form.description) {
        product.description = description.to_string();
    }
    if let Some(category) = super::supplied(&form.category) {
        product.category = category.to_string();
    }
    if let Some(raw_price) = super::supplied(&form.price) {
        product.price = parse_price(raw_price)?;
    }
    if let Some(raw_stock) = super::supplied(&form.stock) {
        product.stock = parse_stock(raw_stock)?;
    }
    if !form.images.is_empty() {
        product.images = upload_images(&state, &form.images).await?;
    }
    product.updated_at = now_rfc3339();

    state.store.update_product(product.clone()).await?;

    info!("product {} updated", product.id);
    Ok(Json(json!({ "success": true, "product": product })).into_response())
}

/// `DELETE /api/products/{id}` -- Delete a product.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    operation_id = "DeleteProduct",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such product")
    )
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    super::validate_id(&id)?;
    if !state.store.delete_product(&id).await? {
        return Err(ApiError::NotFound { resource: "Product" });
    }
    info!("product {id} deleted");
    Ok(Json(json!({ "success": true, "message": "Product deleted" })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1500").unwrap(), 1500.0);
        assert_eq!(parse_price(" 0 ").unwrap(), 0.0);
        assert_eq!(parse_price("99.99").unwrap(), 99.99);
        assert!(parse_price("-1").is_err());
        assert!(parse_price("free").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("10").unwrap(), 10);
        assert_eq!(parse_stock("0").unwrap(), 0);
        assert!(parse_stock("-3").is_err());
        assert!(parse_stock("2.5").is_err());
        assert!(parse_stock("lots").is_err());
    }
}
