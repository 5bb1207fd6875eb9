//! Product listing and CRUD endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use catalog::{CatalogStoreExt, NewProduct, Product, ProductId, ProductQuery, ProductSort};
use common::Money;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiError;

// -- Request types --

/// A price as sent by the admin panel: a JSON number or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    pub fn to_money(&self) -> Result<Money, ApiError> {
        let text = match self {
            PriceInput::Number(n) => n.to_string(),
            PriceInput::Text(s) => s.clone(),
        };
        text.parse()
            .map_err(|_| ApiError::BadRequest(format!("Preço inválido: {text}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub price: PriceInput,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subcategory: String,
    #[serde(default)]
    pub available_sizes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Comma-separated subcategory names.
    pub subcategoria: Option<String>,
    /// Comma-separated sizes.
    pub tamanho: Option<String>,
    pub ordenar: Option<String>,
    pub busca: Option<String>,
}

impl ListParams {
    fn to_query(&self) -> Result<ProductQuery, ApiError> {
        let mut query = ProductQuery::new()
            .subcategories(split_list(self.subcategoria.as_deref()))
            .sizes(split_list(self.tamanho.as_deref()));

        if let Some(key) = self.ordenar.as_deref().filter(|k| !k.is_empty()) {
            let sort = ProductSort::from_key(key)
                .ok_or_else(|| ApiError::BadRequest(format!("Ordenação inválida: {key}")))?;
            query = query.sort(sort);
        }
        if let Some(text) = self.busca.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.search(text);
        }
        Ok(query)
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    /// Decimal string with two places, e.g. `"50.00"`.
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    pub subcategory: String,
    pub category: String,
    pub available_sizes: Vec<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.get(),
            name: product.name,
            price: product.price.to_decimal_string(),
            description: product.description,
            image: product.image,
            subcategory: product.subcategory,
            category: product.category,
            available_sizes: product.available_sizes,
        }
    }
}

pub(crate) fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(ProductResponse::from).collect()
}

#[derive(Debug, Serialize)]
pub struct DeletedProductResponse {
    pub mensagem: &'static str,
    pub produto: ProductResponse,
}

// -- Handlers --

/// GET /produtos: list products with optional filters and sort.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let query = params.to_query()?;
    let products = state.catalog.list_products(&query).await?;
    Ok(Json(to_responses(products)))
}

/// GET /produtos/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(ProductId::new(id)).await?;
    Ok(Json(product.into()))
}

/// POST /produtos: create a product in a subcategory given by name.
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let new_product = resolve(&state, req).await?;
    let product = state.catalog.create_product(new_product).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /produtos/{id}: replace a product.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let new_product = resolve(&state, req).await?;
    let product = state
        .catalog
        .update_product(ProductId::new(id), new_product)
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /produtos/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedProductResponse>, ApiError> {
    let product = state.catalog.delete_product(ProductId::new(id)).await?;
    tracing::info!(product_id = %product.id, "product deleted");
    Ok(Json(DeletedProductResponse {
        mensagem: "Produto excluído com sucesso",
        produto: product.into(),
    }))
}

async fn resolve(state: &AppState, req: ProductRequest) -> Result<NewProduct, ApiError> {
    let price = req.price.to_money()?;
    let subcategory = state
        .catalog
        .subcategory_named(&req.subcategory)
        .await
        .map_err(ApiError::subcategory_as_bad_request)?;

    let mut product = NewProduct::new(req.name, price, subcategory.id).with_image(req.image);
    if let Some(description) = req.description {
        product = product.with_description(description);
    }
    if let Some(sizes) = req.available_sizes {
        product = product.with_sizes(sizes);
    }
    Ok(product)
}
