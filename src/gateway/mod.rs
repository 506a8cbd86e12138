use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    NewOrder, NewOrderLine, NewProduct, NewUser, Order, OrderLine, OrderStatus, OrderWithLines,
    Product, ProductPatch, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryGateway;
pub use postgres::PgGateway;

/// Typed failure codes crossing the gateway boundary. Classification
/// happens on these, never on message substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The remote store could not be reached.
    Unavailable,
    /// A unique constraint rejected the write (in practice: `usuarios.email`).
    UniqueViolation,
    /// Any other constraint rejected the write.
    ConstraintViolation,
    /// The addressed row does not exist.
    NotFound,
    Other,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        kind: GatewayErrorKind,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unavailable, message)
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Table-oriented operations over the remote store. Every method is an
/// independent remote call; no transaction ever spans two of them, so
/// multi-step writes must compensate explicitly when a later step fails.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Lightweight probe read used as the connectivity check before writes.
    async fn ping(&self) -> GatewayResult<()>;

    async fn insert_user(&self, new: NewUser) -> GatewayResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> GatewayResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> GatewayResult<Option<User>>;
    /// Equality lookup on email and password, the login contract of the
    /// `usuarios` table.
    async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<Option<User>>;
    async fn list_users(&self) -> GatewayResult<Vec<User>>;

    async fn insert_product(&self, new: NewProduct) -> GatewayResult<Product>;
    async fn find_product(&self, id: Uuid) -> GatewayResult<Option<Product>>;
    async fn list_products(&self) -> GatewayResult<Vec<Product>>;
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> GatewayResult<Option<Product>>;
    /// Writes an absolute stock value. The caller computes the new stock
    /// from its own snapshot; there is no read-modify-write lock here.
    async fn update_product_stock(&self, id: Uuid, stock: i32) -> GatewayResult<Option<Product>>;
    async fn delete_product(&self, id: Uuid) -> GatewayResult<bool>;

    async fn insert_order(&self, new: NewOrder) -> GatewayResult<Order>;
    /// Batch insert of the lines of one order.
    async fn insert_order_lines(&self, lines: Vec<NewOrderLine>) -> GatewayResult<Vec<OrderLine>>;
    async fn find_order(&self, id: Uuid) -> GatewayResult<Option<Order>>;
    /// Removes the header and any of its lines. Returns whether the
    /// header existed.
    async fn delete_order(&self, id: Uuid) -> GatewayResult<bool>;
    async fn update_order_status(
        &self,
        id: Uuid,
        estado: OrderStatus,
    ) -> GatewayResult<Option<Order>>;
    /// Headers joined with their lines and each line's product, newest
    /// first by `fecha_emision`. Unpaginated.
    async fn list_orders(&self, usuario_id: Option<Uuid>) -> GatewayResult<Vec<OrderWithLines>>;
}
