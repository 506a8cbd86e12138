use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use super::{Gateway, GatewayError, GatewayErrorKind, GatewayResult};
use crate::{
    entity::{
        pedido_detalles::{
            ActiveModel as DetalleActive, Column as DetalleCol, Entity as PedidoDetalles,
            Model as DetalleModel,
        },
        pedidos::{ActiveModel as PedidoActive, Column as PedidoCol, Entity as Pedidos, Model as PedidoModel},
        productos::{ActiveModel as ProductoActive, Column as ProductoCol, Entity as Productos, Model as ProductoModel},
        usuarios::{ActiveModel as UsuarioActive, Column as UsuarioCol, Entity as Usuarios, Model as UsuarioModel},
    },
    models::{
        NewOrder, NewOrderLine, NewProduct, NewUser, Order, OrderLine, OrderLineDetail,
        OrderStatus, OrderWithLines, Product, ProductPatch, User,
    },
};

/// Gateway over a hosted Postgres. One independent statement per trait
/// method; failed multi-step sequences are compensated by the caller.
#[derive(Clone)]
pub struct PgGateway {
    conn: DatabaseConnection,
}

impl PgGateway {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn map_db_err(err: DbErr) -> GatewayError {
    if let Some(sql_err) = err.sql_err() {
        return match sql_err {
            SqlErr::UniqueConstraintViolation(detail) => GatewayError::with_details(
                GatewayErrorKind::UniqueViolation,
                "restricción de unicidad violada",
                detail,
            ),
            SqlErr::ForeignKeyConstraintViolation(detail) => GatewayError::with_details(
                GatewayErrorKind::ConstraintViolation,
                "restricción de integridad violada",
                detail,
            ),
            other => GatewayError::with_details(
                GatewayErrorKind::Other,
                "error de base de datos",
                format!("{other:?}"),
            ),
        };
    }

    match err {
        DbErr::Conn(e) => GatewayError::with_details(
            GatewayErrorKind::Unavailable,
            "no hay conexión con la base de datos",
            e.to_string(),
        ),
        DbErr::ConnectionAcquire(e) => GatewayError::with_details(
            GatewayErrorKind::Unavailable,
            "no hay conexión con la base de datos",
            e.to_string(),
        ),
        DbErr::RecordNotFound(detail) => {
            GatewayError::with_details(GatewayErrorKind::NotFound, "registro no encontrado", detail)
        }
        other => GatewayError::with_details(
            GatewayErrorKind::Other,
            "error de base de datos",
            other.to_string(),
        ),
    }
}

fn user_from_entity(model: UsuarioModel) -> User {
    User {
        id: model.id,
        nombre: model.nombre,
        email: model.email,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: ProductoModel) -> Product {
    Product {
        id: model.id,
        nombre: model.nombre,
        descripcion: model.descripcion,
        precio: model.precio,
        stock: model.stock,
        categoria: model.categoria,
        talla: model.talla,
        color: model.color,
        imagen_url: model.imagen_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_from_entity(model: PedidoModel) -> GatewayResult<Order> {
    let Some(estado) = OrderStatus::parse(&model.estado) else {
        return Err(GatewayError::with_details(
            GatewayErrorKind::Other,
            "estado de pedido desconocido",
            model.estado,
        ));
    };
    Ok(Order {
        id: model.id,
        usuario_id: model.usuario_id,
        fecha_emision: model.fecha_emision.with_timezone(&Utc),
        estado,
        total: model.total,
        observaciones: model.observaciones,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn line_from_entity(model: DetalleModel) -> OrderLine {
    OrderLine {
        id: model.id,
        pedido_id: model.pedido_id,
        producto_id: model.producto_id,
        cantidad: model.cantidad,
        precio_unitario: model.precio_unitario,
        subtotal: model.subtotal,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn ping(&self) -> GatewayResult<()> {
        Usuarios::find()
            .limit(1)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn insert_user(&self, new: NewUser) -> GatewayResult<User> {
        let active = UsuarioActive {
            id: Set(Uuid::new_v4()),
            nombre: Set(new.nombre),
            email: Set(new.email),
            password: Set(new.password),
            created_at: NotSet,
        };
        let model = active.insert(&self.conn).await.map_err(map_db_err)?;
        Ok(user_from_entity(model))
    }

    async fn find_user_by_id(&self, id: Uuid) -> GatewayResult<Option<User>> {
        let model = Usuarios::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(user_from_entity))
    }

    async fn find_user_by_email(&self, email: &str) -> GatewayResult<Option<User>> {
        let model = Usuarios::find()
            .filter(UsuarioCol::Email.eq(email))
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(user_from_entity))
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<Option<User>> {
        let model = Usuarios::find()
            .filter(UsuarioCol::Email.eq(email))
            .filter(UsuarioCol::Password.eq(password))
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(user_from_entity))
    }

    async fn list_users(&self) -> GatewayResult<Vec<User>> {
        let models = Usuarios::find()
            .order_by_asc(UsuarioCol::Nombre)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(user_from_entity).collect())
    }

    async fn insert_product(&self, new: NewProduct) -> GatewayResult<Product> {
        let active = ProductoActive {
            id: Set(Uuid::new_v4()),
            nombre: Set(new.nombre),
            descripcion: Set(new.descripcion),
            precio: Set(new.precio),
            stock: Set(new.stock),
            categoria: Set(new.categoria),
            talla: Set(new.talla),
            color: Set(new.color),
            imagen_url: Set(new.imagen_url),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let model = active.insert(&self.conn).await.map_err(map_db_err)?;
        Ok(product_from_entity(model))
    }

    async fn find_product(&self, id: Uuid) -> GatewayResult<Option<Product>> {
        let model = Productos::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(product_from_entity))
    }

    async fn list_products(&self) -> GatewayResult<Vec<Product>> {
        let models = Productos::find()
            .order_by_desc(ProductoCol::CreatedAt)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(product_from_entity).collect())
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> GatewayResult<Option<Product>> {
        let existing = Productos::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: ProductoActive = existing.into();
        if let Some(nombre) = patch.nombre {
            active.nombre = Set(nombre);
        }
        if let Some(descripcion) = patch.descripcion {
            active.descripcion = Set(Some(descripcion));
        }
        if let Some(precio) = patch.precio {
            active.precio = Set(precio);
        }
        if let Some(stock) = patch.stock {
            active.stock = Set(stock);
        }
        if let Some(categoria) = patch.categoria {
            active.categoria = Set(Some(categoria));
        }
        if let Some(talla) = patch.talla {
            active.talla = Set(Some(talla));
        }
        if let Some(color) = patch.color {
            active.color = Set(Some(color));
        }
        if let Some(imagen_url) = patch.imagen_url {
            active.imagen_url = Set(Some(imagen_url));
        }
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.conn).await.map_err(map_db_err)?;
        Ok(Some(product_from_entity(model)))
    }

    async fn update_product_stock(&self, id: Uuid, stock: i32) -> GatewayResult<Option<Product>> {
        let existing = Productos::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: ProductoActive = existing.into();
        active.stock = Set(stock);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.conn).await.map_err(map_db_err)?;
        Ok(Some(product_from_entity(model)))
    }

    async fn delete_product(&self, id: Uuid) -> GatewayResult<bool> {
        let result = Productos::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_order(&self, new: NewOrder) -> GatewayResult<Order> {
        let active = PedidoActive {
            id: Set(Uuid::new_v4()),
            usuario_id: Set(new.usuario_id),
            fecha_emision: NotSet,
            estado: Set(new.estado.as_str().to_owned()),
            total: Set(new.total),
            observaciones: Set(new.observaciones),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let model = active.insert(&self.conn).await.map_err(map_db_err)?;
        order_from_entity(model)
    }

    async fn insert_order_lines(&self, lines: Vec<NewOrderLine>) -> GatewayResult<Vec<OrderLine>> {
        let Some(pedido_id) = lines.first().map(|l| l.pedido_id) else {
            return Ok(Vec::new());
        };

        let rows: Vec<DetalleActive> = lines
            .into_iter()
            .map(|line| DetalleActive {
                id: Set(Uuid::new_v4()),
                pedido_id: Set(line.pedido_id),
                producto_id: Set(line.producto_id),
                cantidad: Set(line.cantidad),
                precio_unitario: Set(line.precio_unitario),
                subtotal: Set(line.subtotal),
                created_at: NotSet,
            })
            .collect();

        PedidoDetalles::insert_many(rows)
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;

        let models = PedidoDetalles::find()
            .filter(DetalleCol::PedidoId.eq(pedido_id))
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(line_from_entity).collect())
    }

    async fn find_order(&self, id: Uuid) -> GatewayResult<Option<Order>> {
        let model = Pedidos::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        model.map(order_from_entity).transpose()
    }

    async fn delete_order(&self, id: Uuid) -> GatewayResult<bool> {
        PedidoDetalles::delete_many()
            .filter(DetalleCol::PedidoId.eq(id))
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;
        let result = Pedidos::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        estado: OrderStatus,
    ) -> GatewayResult<Option<Order>> {
        let existing = Pedidos::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: PedidoActive = existing.into();
        active.estado = Set(estado.as_str().to_owned());
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.conn).await.map_err(map_db_err)?;
        order_from_entity(model).map(Some)
    }

    async fn list_orders(&self, usuario_id: Option<Uuid>) -> GatewayResult<Vec<OrderWithLines>> {
        let mut finder = Pedidos::find();
        if let Some(usuario_id) = usuario_id {
            finder = finder.filter(PedidoCol::UsuarioId.eq(usuario_id));
        }
        let pedidos = finder
            .order_by_desc(PedidoCol::FechaEmision)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;

        let detalles = pedidos
            .load_many(PedidoDetalles, &self.conn)
            .await
            .map_err(map_db_err)?;

        let producto_ids: Vec<Uuid> = detalles
            .iter()
            .flatten()
            .map(|d| d.producto_id)
            .collect();
        let productos: HashMap<Uuid, Product> = if producto_ids.is_empty() {
            HashMap::new()
        } else {
            Productos::find()
                .filter(ProductoCol::Id.is_in(producto_ids))
                .all(&self.conn)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, product_from_entity(m)))
                .collect()
        };

        let mut result = Vec::with_capacity(pedidos.len());
        for (pedido, lineas) in pedidos.into_iter().zip(detalles) {
            let pedido = order_from_entity(pedido)?;
            let detalles = lineas
                .into_iter()
                .map(|m| {
                    let linea = line_from_entity(m);
                    let producto = productos.get(&linea.producto_id).cloned();
                    OrderLineDetail { linea, producto }
                })
                .collect();
            result.push(OrderWithLines { pedido, detalles });
        }
        Ok(result)
    }
}
