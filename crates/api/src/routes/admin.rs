//! Admin action endpoint.
//!
//! The admin panel posts `{acao, dados}` and the action name selects how
//! `dados` is read.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use catalog::{CategoryId, NewProduct, NewSubcategory, SubcategoryId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use super::products::{PriceInput, ProductResponse};
use super::subcategories::SubcategoryResponse;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub acao: Option<String>,
    pub dados: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AddProduct {
    nome: String,
    preco: PriceInput,
    #[serde(default)]
    descricao: Option<String>,
    #[serde(default)]
    imagem: String,
    subcategoria_id: i32,
}

#[derive(Debug, Deserialize)]
struct AddSubcategory {
    nome: String,
    categoria_id: i32,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AdminResponse {
    Product {
        mensagem: &'static str,
        produto: ProductResponse,
    },
    Subcategory {
        mensagem: &'static str,
        subcategoria: SubcategoryResponse,
    },
}

/// POST /admin
#[tracing::instrument(skip(state, req), fields(acao = ?req.acao))]
pub async fn handle(
    State(state): State<AppState>,
    Json(req): Json<AdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), ApiError> {
    let (Some(acao), Some(dados)) = (req.acao.filter(|a| !a.is_empty()), req.dados) else {
        return Err(ApiError::BadRequest(
            "Ação e dados são obrigatórios".to_string(),
        ));
    };

    let response = match acao.as_str() {
        "adicionarProduto" => {
            let dados: AddProduct = parse_dados(dados)?;
            let mut product = NewProduct::new(
                dados.nome,
                dados.preco.to_money()?,
                SubcategoryId::new(dados.subcategoria_id),
            )
            .with_image(dados.imagem);
            if let Some(descricao) = dados.descricao {
                product = product.with_description(descricao);
            }
            let product = state
                .catalog
                .create_product(product)
                .await
                .map_err(ApiError::subcategory_as_bad_request)?;
            AdminResponse::Product {
                mensagem: "Produto adicionado",
                produto: product.into(),
            }
        }
        "adicionarSubcategoria" => {
            let dados: AddSubcategory = parse_dados(dados)?;
            let subcategory = state
                .catalog
                .create_subcategory(NewSubcategory::new(
                    dados.nome,
                    vec![CategoryId::new(dados.categoria_id)],
                ))
                .await
                .map_err(ApiError::category_as_bad_request)?;
            AdminResponse::Subcategory {
                mensagem: "Subcategoria adicionada",
                subcategoria: subcategory.into(),
            }
        }
        _ => return Err(ApiError::BadRequest("Ação desconhecida".to_string())),
    };

    tracing::info!(%acao, "admin action applied");
    Ok((StatusCode::CREATED, Json(response)))
}

fn parse_dados<T: DeserializeOwned>(dados: Value) -> Result<T, ApiError> {
    serde_json::from_value(dados).map_err(|e| ApiError::BadRequest(format!("Dados inválidos: {e}")))
}
