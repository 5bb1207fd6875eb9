//! Category endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::{CatalogStoreExt, Category, CategoryId};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::products::{ProductResponse, to_responses};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub nome: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub nome: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.get(),
            nome: category.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedCategoryResponse {
    pub mensagem: &'static str,
    pub categoria: CategoryResponse,
}

/// GET /categorias: every category ordered by name.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// GET /categorias/{nome}: products of the category with this name.
#[tracing::instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(nome): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.products_in_category_named(&nome).await?;
    Ok(Json(to_responses(products)))
}

/// POST /categorias
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = state.catalog.create_category(&req.nome).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// PUT /categorias/{id}: rename.
#[tracing::instrument(skip(state))]
pub async fn rename(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .catalog
        .rename_category(CategoryId::new(id), &req.nome)
        .await?;
    Ok(Json(category.into()))
}

/// DELETE /categorias/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeletedCategoryResponse>, ApiError> {
    let category = state.catalog.delete_category(CategoryId::new(id)).await?;
    Ok(Json(DeletedCategoryResponse {
        mensagem: "Categoria excluída com sucesso",
        categoria: category.into(),
    }))
}
