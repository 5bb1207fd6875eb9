//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use domain::{CartError, CheckoutError, DomainError};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"erro": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),

    /// The request conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Catalog store error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "erro": message });
        (status, axum::Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, "Produto não encontrado".to_string())
        }
        CatalogError::CategoryNotFound(_) | CatalogError::CategoryNameNotFound(_) => {
            (StatusCode::NOT_FOUND, "Categoria não encontrada".to_string())
        }
        CatalogError::SubcategoryNotFound(_) | CatalogError::SubcategoryNameNotFound(_) => {
            (StatusCode::NOT_FOUND, "Subcategoria não encontrada".to_string())
        }
        CatalogError::InvalidPrice(_)
        | CatalogError::InvalidName { .. }
        | CatalogError::NoCategories => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::Duplicate { .. } | CatalogError::InUse { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CatalogError::Database(_) | CatalogError::Migration(_) => {
            tracing::error!(error = %err, "catalog store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro no servidor".to_string(),
            )
        }
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let err = match err {
        DomainError::Catalog(inner) => return catalog_error_to_response(inner),
        other => other,
    };
    match &err {
        DomainError::Cart(CartError::Storage(_)) | DomainError::Storage(_) => {
            tracing::error!(error = %err, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro no servidor".to_string(),
            )
        }
        DomainError::Checkout(CheckoutError::InvalidStageTransition { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        DomainError::Checkout(CheckoutError::CreditCheck(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        _ => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

impl ApiError {
    /// Maps a missing subcategory to 400, the way product writes report it.
    pub fn subcategory_as_bad_request(err: CatalogError) -> Self {
        match err {
            CatalogError::SubcategoryNotFound(_) | CatalogError::SubcategoryNameNotFound(_) => {
                ApiError::BadRequest("Subcategoria não encontrada".to_string())
            }
            other => ApiError::Catalog(other),
        }
    }

    /// Maps a missing linked category to 400, the way subcategory writes
    /// report it.
    pub fn category_as_bad_request(err: CatalogError) -> Self {
        match err {
            CatalogError::CategoryNotFound(id) => {
                ApiError::BadRequest(format!("Categoria não encontrada: {id}"))
            }
            other => ApiError::Catalog(other),
        }
    }
}
