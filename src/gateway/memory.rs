use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Gateway, GatewayError, GatewayErrorKind, GatewayResult};
use crate::models::{
    NewOrder, NewOrderLine, NewProduct, NewUser, Order, OrderLine, OrderLineDetail, OrderStatus,
    OrderWithLines, Product, ProductPatch, User,
};

struct UserRow {
    user: User,
    password: String,
}

#[derive(Default)]
struct Tables {
    usuarios: Vec<UserRow>,
    productos: Vec<Product>,
    pedidos: Vec<Order>,
    detalles: Vec<OrderLine>,
}

/// In-process gateway with the same contract as the hosted one. Besides
/// backing the integration tests it can simulate an unreachable store
/// and inject failures into specific operations.
#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
    offline: AtomicBool,
    fail_line_inserts: AtomicUsize,
    fail_order_deletes: AtomicUsize,
    fail_stock_updates: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The next `count` calls to `insert_order_lines` fail.
    pub fn fail_next_line_inserts(&self, count: usize) {
        self.fail_line_inserts.store(count, Ordering::SeqCst);
    }

    /// The next `count` calls to `delete_order` fail.
    pub fn fail_next_order_deletes(&self, count: usize) {
        self.fail_order_deletes.store(count, Ordering::SeqCst);
    }

    /// The next `count` calls to `update_product_stock` fail.
    pub fn fail_next_stock_updates(&self, count: usize) {
        self.fail_stock_updates.store(count, Ordering::SeqCst);
    }

    fn check_online(&self) -> GatewayResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(GatewayError::unavailable(
                "no hay conexión con la base de datos",
            ))
        } else {
            Ok(())
        }
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn injected() -> GatewayError {
        GatewayError::new(GatewayErrorKind::Other, "fallo simulado de la pasarela")
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn ping(&self) -> GatewayResult<()> {
        self.check_online()
    }

    async fn insert_user(&self, new: NewUser) -> GatewayResult<User> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.usuarios.iter().any(|row| row.user.email == new.email) {
            return Err(GatewayError::with_details(
                GatewayErrorKind::UniqueViolation,
                "restricción de unicidad violada",
                "usuarios_email_key",
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            nombre: new.nombre,
            email: new.email,
            created_at: Utc::now(),
        };
        tables.usuarios.push(UserRow {
            user: user.clone(),
            password: new.password,
        });
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> GatewayResult<Option<User>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .usuarios
            .iter()
            .find(|row| row.user.id == id)
            .map(|row| row.user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> GatewayResult<Option<User>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .usuarios
            .iter()
            .find(|row| row.user.email == email)
            .map(|row| row.user.clone()))
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<Option<User>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .usuarios
            .iter()
            .find(|row| row.user.email == email && row.password == password)
            .map(|row| row.user.clone()))
    }

    async fn list_users(&self) -> GatewayResult<Vec<User>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.usuarios.iter().map(|row| row.user.clone()).collect();
        users.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        Ok(users)
    }

    async fn insert_product(&self, new: NewProduct) -> GatewayResult<Product> {
        self.check_online()?;
        if new.precio <= 0.0 || new.stock < 0 {
            return Err(GatewayError::new(
                GatewayErrorKind::ConstraintViolation,
                "restricción de integridad violada",
            ));
        }
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            nombre: new.nombre,
            descripcion: new.descripcion,
            precio: new.precio,
            stock: new.stock,
            categoria: new.categoria,
            talla: new.talla,
            color: new.color,
            imagen_url: new.imagen_url,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.productos.push(product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> GatewayResult<Option<Product>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.productos.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self) -> GatewayResult<Vec<Product>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut productos = tables.productos.clone();
        productos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(productos)
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> GatewayResult<Option<Product>> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let Some(product) = tables.productos.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(nombre) = patch.nombre {
            product.nombre = nombre;
        }
        if let Some(descripcion) = patch.descripcion {
            product.descripcion = Some(descripcion);
        }
        if let Some(precio) = patch.precio {
            product.precio = precio;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(categoria) = patch.categoria {
            product.categoria = Some(categoria);
        }
        if let Some(talla) = patch.talla {
            product.talla = Some(talla);
        }
        if let Some(color) = patch.color {
            product.color = Some(color);
        }
        if let Some(imagen_url) = patch.imagen_url {
            product.imagen_url = Some(imagen_url);
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn update_product_stock(&self, id: Uuid, stock: i32) -> GatewayResult<Option<Product>> {
        self.check_online()?;
        if Self::take_failure(&self.fail_stock_updates) {
            return Err(Self::injected());
        }
        if stock < 0 {
            return Err(GatewayError::new(
                GatewayErrorKind::ConstraintViolation,
                "restricción de integridad violada",
            ));
        }
        let mut tables = self.tables.write().await;
        let Some(product) = tables.productos.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.stock = stock;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> GatewayResult<bool> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let before = tables.productos.len();
        tables.productos.retain(|p| p.id != id);
        Ok(tables.productos.len() < before)
    }

    async fn insert_order(&self, new: NewOrder) -> GatewayResult<Order> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if !tables.usuarios.iter().any(|row| row.user.id == new.usuario_id) {
            return Err(GatewayError::with_details(
                GatewayErrorKind::ConstraintViolation,
                "restricción de integridad violada",
                "pedidos_usuario_id_fkey",
            ));
        }
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            usuario_id: new.usuario_id,
            fecha_emision: now,
            estado: new.estado,
            total: new.total,
            observaciones: new.observaciones,
            created_at: now,
            updated_at: now,
        };
        tables.pedidos.push(order.clone());
        Ok(order)
    }

    async fn insert_order_lines(&self, lines: Vec<NewOrderLine>) -> GatewayResult<Vec<OrderLine>> {
        self.check_online()?;
        if Self::take_failure(&self.fail_line_inserts) {
            return Err(Self::injected());
        }
        let mut tables = self.tables.write().await;
        for line in &lines {
            if !tables.productos.iter().any(|p| p.id == line.producto_id) {
                return Err(GatewayError::with_details(
                    GatewayErrorKind::ConstraintViolation,
                    "restricción de integridad violada",
                    "pedido_detalles_producto_id_fkey",
                ));
            }
        }
        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            let stored = OrderLine {
                id: Uuid::new_v4(),
                pedido_id: line.pedido_id,
                producto_id: line.producto_id,
                cantidad: line.cantidad,
                precio_unitario: line.precio_unitario,
                subtotal: line.subtotal,
                created_at: Utc::now(),
            };
            tables.detalles.push(stored.clone());
            inserted.push(stored);
        }
        Ok(inserted)
    }

    async fn find_order(&self, id: Uuid) -> GatewayResult<Option<Order>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.pedidos.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_order(&self, id: Uuid) -> GatewayResult<bool> {
        self.check_online()?;
        if Self::take_failure(&self.fail_order_deletes) {
            return Err(Self::injected());
        }
        let mut tables = self.tables.write().await;
        tables.detalles.retain(|d| d.pedido_id != id);
        let before = tables.pedidos.len();
        tables.pedidos.retain(|p| p.id != id);
        Ok(tables.pedidos.len() < before)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        estado: OrderStatus,
    ) -> GatewayResult<Option<Order>> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let Some(order) = tables.pedidos.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        order.estado = estado;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn list_orders(&self, usuario_id: Option<Uuid>) -> GatewayResult<Vec<OrderWithLines>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let productos: HashMap<Uuid, Product> = tables
            .productos
            .iter()
            .map(|p| (p.id, p.clone()))
            .collect();

        let mut pedidos: Vec<Order> = tables
            .pedidos
            .iter()
            .filter(|p| usuario_id.is_none_or(|uid| p.usuario_id == uid))
            .cloned()
            .collect();
        pedidos.sort_by(|a, b| b.fecha_emision.cmp(&a.fecha_emision));

        Ok(pedidos
            .into_iter()
            .map(|pedido| {
                let detalles = tables
                    .detalles
                    .iter()
                    .filter(|d| d.pedido_id == pedido.id)
                    .map(|linea| OrderLineDetail {
                        linea: linea.clone(),
                        producto: productos.get(&linea.producto_id).cloned(),
                    })
                    .collect();
                OrderWithLines { pedido, detalles }
            })
            .collect())
    }
}
