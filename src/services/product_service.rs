use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    gateway::{GatewayError, GatewayErrorKind},
    models::{NewProduct, Product, ProductPatch},
    response::ApiResponse,
    state::AppState,
};

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    if payload.nombre.trim().is_empty() {
        return Err(AppError::Validation(
            "El nombre del producto es obligatorio".into(),
        ));
    }
    if payload.precio <= 0.0 {
        return Err(AppError::Validation(
            "El precio debe ser mayor que cero".into(),
        ));
    }
    if payload.stock < 0 {
        return Err(AppError::Validation(
            "El stock no puede ser negativo".into(),
        ));
    }

    state
        .gateway
        .ping()
        .await
        .map_err(|err| AppError::Network {
            details: Some(err.message),
        })?;

    let product = state
        .gateway
        .insert_product(NewProduct {
            nombre: payload.nombre,
            descripcion: payload.descripcion,
            precio: payload.precio,
            stock: payload.stock,
            categoria: payload.categoria,
            talla: payload.talla,
            color: payload.color,
            imagen_url: payload.imagen_url,
        })
        .await
        .map_err(|err| map_product_err(err, "No se pudo crear el producto"))?;

    Ok(ApiResponse::success("Producto creado", product))
}

pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items = state
        .gateway
        .list_products()
        .await
        .map_err(|err| map_product_err(err, "No se pudieron cargar los productos"))?;
    Ok(ApiResponse::success("Productos", ProductList { items }))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = state
        .gateway
        .find_product(id)
        .await
        .map_err(|err| map_product_err(err, "No se pudo consultar el producto"))?
        .ok_or_else(|| AppError::Product("Producto no encontrado".into()))?;
    Ok(ApiResponse::success("Producto", product))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    if payload.precio.is_some_and(|precio| precio <= 0.0) {
        return Err(AppError::Validation(
            "El precio debe ser mayor que cero".into(),
        ));
    }
    if payload.stock.is_some_and(|stock| stock < 0) {
        return Err(AppError::Validation(
            "El stock no puede ser negativo".into(),
        ));
    }

    let product = state
        .gateway
        .update_product(
            id,
            ProductPatch {
                nombre: payload.nombre,
                descripcion: payload.descripcion,
                precio: payload.precio,
                stock: payload.stock,
                categoria: payload.categoria,
                talla: payload.talla,
                color: payload.color,
                imagen_url: payload.imagen_url,
            },
        )
        .await
        .map_err(|err| map_product_err(err, "No se pudo actualizar el producto"))?
        .ok_or_else(|| AppError::Product("Producto no encontrado".into()))?;

    Ok(ApiResponse::success("Producto actualizado", product))
}

pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let deleted = state
        .gateway
        .delete_product(id)
        .await
        .map_err(|err| map_product_err(err, "No se pudo eliminar el producto"))?;

    if !deleted {
        return Err(AppError::Product("Producto no encontrado".into()));
    }

    Ok(ApiResponse::success(
        "Producto eliminado",
        serde_json::json!({}),
    ))
}

fn map_product_err(err: GatewayError, message: &str) -> AppError {
    match err.kind {
        GatewayErrorKind::Unavailable => AppError::Network {
            details: Some(err.message),
        },
        GatewayErrorKind::UniqueViolation | GatewayErrorKind::ConstraintViolation => {
            AppError::Validation("Los datos proporcionados no son válidos".into())
        }
        _ => AppError::Product(message.to_string()),
    }
}
