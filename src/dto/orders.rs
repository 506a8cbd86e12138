use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{OrderStatus, OrderWithLines};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub producto_id: Uuid,
    pub cantidad: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub usuario_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub estado: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithLines>,
}
