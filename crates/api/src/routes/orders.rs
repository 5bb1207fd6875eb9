//! Order intake.
//!
//! Orders are placed on the client; the backend only acknowledges and logs
//! whatever document it receives.

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct OrderReceivedResponse {
    pub mensagem: &'static str,
}

/// POST /pedidos
#[tracing::instrument(skip(order))]
pub async fn receive(Json(order): Json<Value>) -> (StatusCode, Json<OrderReceivedResponse>) {
    let order_number = order
        .get("order_number")
        .or_else(|| order.get("numero"))
        .and_then(Value::as_str)
        .unwrap_or("-");
    tracing::info!(%order_number, pedido = %order, "order received");
    metrics::counter!("api_orders_received_total").increment(1);

    (
        StatusCode::CREATED,
        Json(OrderReceivedResponse {
            mensagem: "Pedido recebido com sucesso!",
        }),
    )
}
