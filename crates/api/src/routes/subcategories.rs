//! Subcategory endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::{CatalogStoreExt, CategoryId, NewSubcategory, Subcategory, SubcategoryId};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::categories::CategoryResponse;
use super::products::{ProductResponse, to_responses};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SubcategoryRequest {
    pub nome: String,
    /// Linked category ids; the first is the primary category.
    #[serde(default)]
    pub categorias: Vec<i32>,
}

impl SubcategoryRequest {
    fn into_new(self) -> NewSubcategory {
        NewSubcategory::new(
            self.nome,
            self.categorias.into_iter().map(CategoryId::new).collect(),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct SubcategoryResponse {
    pub id: i32,
    pub nome: String,
    /// Name of the primary category.
    pub categoria: Option<String>,
    pub categorias: Vec<CategoryResponse>,
}

impl From<Subcategory> for SubcategoryResponse {
    fn from(subcategory: Subcategory) -> Self {
        Self {
            id: subcategory.id.get(),
            nome: subcategory.name,
            categoria: subcategory.categories.first().map(|c| c.name.clone()),
            categorias: subcategory.categories.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedSubcategoryResponse {
    pub mensagem: &'static str,
    pub subcategoria: SubcategoryResponse,
}

/// GET /subcategorias
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubcategoryResponse>>, ApiError> {
    let subcategories = state.catalog.list_subcategories().await?;
    Ok(Json(subcategories.into_iter().map(Into::into).collect()))
}

/// GET /subcategorias/{id}/produtos
#[tracing::instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state
        .catalog
        .products_in_subcategory(SubcategoryId::new(id))
        .await?;
    Ok(Json(to_responses(products)))
}

/// POST /subcategorias
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<SubcategoryRequest>,
) -> Result<(StatusCode, Json<SubcategoryResponse>), ApiError> {
    let subcategory = state
        .catalog
        .create_subcategory(req.into_new())
        .await
        .map_err(ApiError::category_as_bad_request)?;
    Ok((StatusCode::CREATED, Json(subcategory.into())))
}

/// PUT /subcategorias/{id}
#[tracing::instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<SubcategoryRequest>,
) -> Result<Json<SubcategoryResponse>, ApiError> {
    let subcategory = state
        .catalog
        .update_subcategory(SubcategoryId::new(id), req.into_new())
        .await
        .map_err(ApiError::category_as_bad_request)?;
    Ok(Json(subcategory.into()))
}

/// DELETE /subcategorias/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeletedSubcategoryResponse>, ApiError> {
    let subcategory = state
        .catalog
        .delete_subcategory(SubcategoryId::new(id))
        .await?;
    Ok(Json(DeletedSubcategoryResponse {
        mensagem: "Subcategoria excluída com sucesso",
        subcategoria: subcategory.into(),
    }))
}
