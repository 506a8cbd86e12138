use uuid::Uuid;

use crate::{
    cart::Cart,
    dto::orders::{CreateOrderRequest, OrderItemRequest, OrderList},
    error::{AppError, AppResult},
    gateway::{Gateway, GatewayErrorKind},
    models::{NewOrder, NewOrderLine, Order, OrderStatus},
    response::ApiResponse,
    state::AppState,
};

const ROLLBACK_ATTEMPTS: u32 = 3;

/// Creates an order from raw `(producto_id, cantidad)` pairs: probes
/// connectivity, resolves the cart against current products and then
/// runs the multi-step write sequence.
pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.usuario_id.is_nil() {
        return Err(AppError::Validation(
            "Debes seleccionar para quién es el pedido".into(),
        ));
    }
    if payload.items.is_empty() {
        return Err(AppError::Validation(
            "Agrega productos al carrito antes de crear el pedido".into(),
        ));
    }

    state
        .gateway
        .ping()
        .await
        .map_err(|err| AppError::Network {
            details: Some(err.message),
        })?;

    let cart = resolve_cart(state, &payload.items).await?;
    submit_order(state, payload.usuario_id, &cart, payload.observaciones).await
}

/// Builds a cart from request items, snapshotting each product's current
/// price and stock.
pub async fn resolve_cart(state: &AppState, items: &[OrderItemRequest]) -> AppResult<Cart> {
    let mut cart = Cart::new();
    for item in items {
        if item.cantidad < 1 {
            return Err(AppError::Validation("La cantidad debe ser al menos 1".into()));
        }
        let producto = state
            .gateway
            .find_product(item.producto_id)
            .await
            .map_err(|err| match err.kind {
                GatewayErrorKind::Unavailable => AppError::Network {
                    details: Some(err.message),
                },
                _ => AppError::Product("No se pudieron cargar los productos".into()),
            })?
            .ok_or_else(|| AppError::Product("Producto no encontrado".into()))?;

        cart.add_units(producto, item.cantidad)
            .map_err(|err| AppError::Validation(err.to_string()))?;
    }
    Ok(cart)
}

/// Writes the order as a sequence of independent gateway calls: header,
/// line batch, then one stock decrement per item. The header insert is
/// undone if the line batch fails; stock decrement failures are only
/// logged, so a reported success guarantees header and lines but not
/// updated stock.
pub async fn submit_order(
    state: &AppState,
    usuario_id: Uuid,
    cart: &Cart,
    observaciones: Option<String>,
) -> AppResult<ApiResponse<Order>> {
    if cart.is_empty() {
        return Err(AppError::Validation("El carrito está vacío".into()));
    }

    let total = cart.total();

    let pedido = state
        .gateway
        .insert_order(NewOrder {
            usuario_id,
            estado: OrderStatus::Pending,
            total,
            observaciones,
        })
        .await
        .map_err(|err| match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            GatewayErrorKind::ConstraintViolation => {
                AppError::Validation("Los datos proporcionados no son válidos".into())
            }
            _ => AppError::Order("No se pudo crear el pedido".into()),
        })?;

    let lines: Vec<NewOrderLine> = cart
        .items()
        .iter()
        .map(|item| NewOrderLine {
            pedido_id: pedido.id,
            producto_id: item.producto.id,
            cantidad: item.cantidad,
            precio_unitario: item.producto.precio,
            subtotal: item.subtotal,
        })
        .collect();

    if let Err(err) = state.gateway.insert_order_lines(lines).await {
        tracing::warn!(
            pedido_id = %pedido.id,
            error = %err,
            "line insert failed, removing the order header"
        );
        rollback_order_header(state.gateway.as_ref(), pedido.id).await;
        return Err(match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            _ => AppError::Order("No se pudo crear el pedido".into()),
        });
    }

    // Stock decrements come last and do not affect the outcome. The new
    // value is computed from the cart's snapshot; two overlapping orders
    // can therefore oversell a product.
    for item in cart.items() {
        let new_stock = item.producto.stock - item.cantidad;
        match state
            .gateway
            .update_product_stock(item.producto.id, new_stock)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(
                producto_id = %item.producto.id,
                "product disappeared before its stock update"
            ),
            Err(err) => tracing::warn!(
                producto_id = %item.producto.id,
                error = %err,
                "stock update failed after order creation"
            ),
        }
    }

    Ok(ApiResponse::success("Pedido creado", pedido))
}

/// Compensating delete for a header whose lines could not be written.
/// Each attempt is verified by re-reading the header; gives up after a
/// bounded number of rounds. Returns whether the header is confirmed gone.
async fn rollback_order_header(gateway: &dyn Gateway, pedido_id: Uuid) -> bool {
    for attempt in 1..=ROLLBACK_ATTEMPTS {
        if let Err(err) = gateway.delete_order(pedido_id).await {
            tracing::warn!(
                pedido_id = %pedido_id,
                attempt,
                error = %err,
                "compensating delete failed"
            );
        }
        match gateway.find_order(pedido_id).await {
            Ok(None) => return true,
            Ok(Some(_)) => tracing::warn!(
                pedido_id = %pedido_id,
                attempt,
                "order header still present after compensating delete"
            ),
            Err(err) => tracing::warn!(
                pedido_id = %pedido_id,
                attempt,
                error = %err,
                "could not verify the compensating delete"
            ),
        }
    }
    tracing::error!(
        pedido_id = %pedido_id,
        "order header could not be removed, manual cleanup required"
    );
    false
}

pub async fn update_order_status(
    state: &AppState,
    id: Uuid,
    estado: OrderStatus,
) -> AppResult<ApiResponse<Order>> {
    let updated = state
        .gateway
        .update_order_status(id, estado)
        .await
        .map_err(|err| match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            _ => AppError::Order("No se pudo actualizar el pedido".into()),
        })?
        .ok_or_else(|| AppError::Order("Pedido no encontrado".into()))?;

    Ok(ApiResponse::success("Pedido actualizado", updated))
}

pub async fn list_orders(
    state: &AppState,
    usuario_id: Option<Uuid>,
) -> AppResult<ApiResponse<OrderList>> {
    let items = state
        .gateway
        .list_orders(usuario_id)
        .await
        .map_err(|err| match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            _ => AppError::Order("No se pudieron cargar los pedidos".into()),
        })?;

    Ok(ApiResponse::success("Pedidos", OrderList { items }))
}
