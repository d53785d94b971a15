//! Product API handlers.
//!
//! Each handler makes exactly one call to the product service and shapes the
//! answer. Which failures get a dedicated response differs per operation:
//!
//! | Operation | Mapping |
//! |-----------|---------|
//! | list, get, delete, upload | NOT-FOUND → structured 404 |
//! | create | BAD-REQUEST → downstream body, 400 |
//! | update | none |

use std::io;

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use futures_util::stream;
use tokio::sync::mpsc;

use crate::downstream::UploadFile;
use crate::http::error::ApiError;
use crate::http::request::Downstream;
use crate::http::response;
use crate::products::Product;

/// Chunks buffered between the inbound upload and the outbound request.
const UPLOAD_WINDOW: usize = 8;

pub async fn list_products(Downstream(client): Downstream) -> Result<Response, ApiError> {
    let products = client.list().await.map_err(ApiError::not_found_or_raise)?;
    Ok(response::json_array(products))
}

pub async fn get_product(
    Downstream(client): Downstream,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match client.get(&id).await.map_err(ApiError::not_found_or_raise)? {
        Some(product) => Ok(Json(product).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn create_product(
    Downstream(client): Downstream,
    Json(product): Json<Product>,
) -> Result<Response, ApiError> {
    let product = product.stamped(Utc::now());
    let saved = client
        .create(&product)
        .await
        .map_err(ApiError::bad_request_or_raise)?;

    let id = saved.id.clone();
    tracing::info!(id = ?id, "Product created");
    Ok(response::created(id.as_deref(), saved))
}

/// Answers `201 Created`, like create.
pub async fn update_product(
    Downstream(client): Downstream,
    Path(id): Path<String>,
    Json(product): Json<Product>,
) -> Result<Response, ApiError> {
    let saved = client
        .update(&id, &product)
        .await
        .map_err(ApiError::Unhandled)?;
    Ok(response::created(Some(id.as_str()), saved))
}

pub async fn delete_product(
    Downstream(client): Downstream,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    client
        .delete(&id)
        .await
        .map_err(ApiError::not_found_or_raise)?;

    tracing::info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_photo(
    Downstream(client): Downstream,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(ApiError::Multipart)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(str::to_owned);

        // The outbound part reads from the channel while `pump` fills it.
        let (tx, mut rx) = mpsc::channel(UPLOAD_WINDOW);
        let content = reqwest::Body::wrap_stream(stream::poll_fn(move |cx| rx.poll_recv(cx)));
        let file = UploadFile {
            filename,
            content_type,
            content,
        };

        let (pumped, uploaded) = tokio::join!(pump(field, tx), client.upload(&id, file));
        pumped.map_err(ApiError::Multipart)?;
        let saved = uploaded.map_err(ApiError::not_found_or_raise)?;
        let saved_id = saved.id.clone();

        return Ok(response::created(saved_id.as_deref(), saved));
    }

    Err(ApiError::MissingFile)
}

/// Copy the field's chunks into `tx` until the field ends or nobody is reading.
async fn pump(
    mut field: Field<'_>,
    tx: mpsc::Sender<io::Result<Bytes>>,
) -> Result<(), MultipartError> {
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    return Ok(());
                }
            }
            Ok(None) => return Ok(()),
            Err(err) => {
                let _ = tx.send(Err(io::Error::other(err.body_text()))).await;
                return Err(err);
            }
        }
    }
}
