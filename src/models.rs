use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload for the `usuarios` table. The password travels
/// to the gateway as provided; it is never echoed back in a [`User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: f64,
    pub stock: i32,
    pub categoria: Option<String>,
    pub talla: Option<String>,
    pub color: Option<String>,
    pub imagen_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: f64,
    pub stock: i32,
    pub categoria: Option<String>,
    pub talla: Option<String>,
    pub color: Option<String>,
    pub imagen_url: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
    pub stock: Option<i32>,
    pub categoria: Option<String>,
    pub talla: Option<String>,
    pub color: Option<String>,
    pub imagen_url: Option<String>,
}

/// The four order states. Any state may be set from any other; there is
/// no transition machine on top of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProcess,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::InProcess,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProcess => "in_process",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "in_process" => Some(OrderStatus::InProcess),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub fecha_emision: DateTime<Utc>,
    pub estado: OrderStatus,
    pub total: f64,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub usuario_id: Uuid,
    pub estado: OrderStatus,
    pub total: f64,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub pedido_id: Uuid,
    pub producto_id: Uuid,
    pub cantidad: i32,
    pub precio_unitario: f64,
    pub subtotal: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub pedido_id: Uuid,
    pub producto_id: Uuid,
    pub cantidad: i32,
    pub precio_unitario: f64,
    pub subtotal: f64,
}

/// One stored line plus its product, resolved for display. The product
/// may have been deleted since the order was placed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderLineDetail {
    pub linea: OrderLine,
    pub producto: Option<Product>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithLines {
    pub pedido: Order,
    pub detalles: Vec<OrderLineDetail>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn order_status_round_trips_through_str() {
        for estado in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(estado.as_str()), Some(estado));
        }
        assert_eq!(OrderStatus::parse("entregado"), None);
    }

    #[test]
    fn order_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProcess).unwrap();
        assert_eq!(json, "\"in_process\"");
    }
}
