//! Checkout pricing quote.

use axum::Json;
use axum::extract::State;
use catalog::ProductId;
use domain::{Cart, DeliveryType, PaymentMethod, PriceBreakdown};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct QuoteItem {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<QuoteItem>,
    #[serde(default)]
    pub delivery_type: Option<DeliveryType>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Amounts as decimal strings, e.g. `"132.00"`.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub subtotal: String,
    pub shipping_fee: String,
    pub discount: String,
    pub total: String,
}

impl From<PriceBreakdown> for QuoteResponse {
    fn from(quote: PriceBreakdown) -> Self {
        Self {
            subtotal: quote.subtotal.to_decimal_string(),
            shipping_fee: quote.shipping_fee.to_decimal_string(),
            discount: quote.discount.to_decimal_string(),
            total: quote.total.to_decimal_string(),
        }
    }
}

/// POST /checkout/cotacao: prices a cart with current catalog prices.
///
/// Items go through the same checks as adding to the cart, so sized
/// products need an offered size and repeated items merge.
#[tracing::instrument(skip(state, req), fields(items = req.items.len()))]
pub async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let mut cart = Cart::new();
    for item in req.items {
        if item.quantity == 0 {
            return Err(ApiError::BadRequest(format!(
                "Quantidade inválida para o produto {}",
                item.product_id
            )));
        }
        let product = state
            .catalog
            .get_product(ProductId::new(item.product_id))
            .await
            .map_err(|e| match e {
                catalog::CatalogError::ProductNotFound(id) => {
                    ApiError::BadRequest(format!("Produto não encontrado: {id}"))
                }
                other => other.into(),
            })?;
        cart.add_item(
            &product,
            item.quantity,
            item.size.as_deref(),
            item.color.as_deref(),
        )
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }

    let quote = state
        .pricing
        .quote_cart(&cart, req.delivery_type, req.payment_method);
    Ok(Json(quote.into()))
}
