use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// One product in the cart with its running subtotal. The product data
/// is a snapshot taken when the item was added; the authoritative stock
/// lives in the gateway.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItem {
    pub producto: Product,
    pub cantidad: i32,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Solo hay {stock} unidades disponibles de {nombre}")]
    InsufficientStock { nombre: String, stock: i32 },
    #[error("La cantidad debe ser al menos 1")]
    InvalidQuantity,
}

/// Caller-held, in-memory cart. It is never persisted; submitting an
/// order consumes its contents.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of the product, capped by its stock.
    pub fn add(&mut self, producto: Product) -> Result<(), CartError> {
        if let Some(item) = self.items.iter_mut().find(|i| i.producto.id == producto.id) {
            if item.cantidad >= item.producto.stock {
                return Err(CartError::InsufficientStock {
                    nombre: item.producto.nombre.clone(),
                    stock: item.producto.stock,
                });
            }
            item.cantidad += 1;
            item.subtotal = f64::from(item.cantidad) * item.producto.precio;
            return Ok(());
        }

        if producto.stock < 1 {
            return Err(CartError::InsufficientStock {
                nombre: producto.nombre,
                stock: producto.stock,
            });
        }
        let subtotal = producto.precio;
        self.items.push(CartItem {
            producto,
            cantidad: 1,
            subtotal,
        });
        Ok(())
    }

    /// Adds `cantidad` units at once, accumulating onto an existing item.
    pub fn add_units(&mut self, producto: Product, cantidad: i32) -> Result<(), CartError> {
        if cantidad < 1 {
            return Err(CartError::InvalidQuantity);
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.producto.id == producto.id) {
            let nueva = item.cantidad + cantidad;
            if nueva > item.producto.stock {
                return Err(CartError::InsufficientStock {
                    nombre: item.producto.nombre.clone(),
                    stock: item.producto.stock,
                });
            }
            item.cantidad = nueva;
            item.subtotal = f64::from(item.cantidad) * item.producto.precio;
            return Ok(());
        }

        if cantidad > producto.stock {
            return Err(CartError::InsufficientStock {
                nombre: producto.nombre,
                stock: producto.stock,
            });
        }
        let subtotal = f64::from(cantidad) * producto.precio;
        self.items.push(CartItem {
            producto,
            cantidad,
            subtotal,
        });
        Ok(())
    }

    /// Sets the quantity of an item; zero or less removes it. Unknown
    /// product ids are ignored.
    pub fn set_quantity(&mut self, producto_id: Uuid, cantidad: i32) -> Result<(), CartError> {
        if cantidad <= 0 {
            self.remove(producto_id);
            return Ok(());
        }
        let Some(item) = self.items.iter_mut().find(|i| i.producto.id == producto_id) else {
            return Ok(());
        };
        if cantidad > item.producto.stock {
            return Err(CartError::InsufficientStock {
                nombre: item.producto.nombre.clone(),
                stock: item.producto.stock,
            });
        }
        item.cantidad = cantidad;
        item.subtotal = f64::from(item.cantidad) * item.producto.precio;
        Ok(())
    }

    pub fn remove(&mut self, producto_id: Uuid) {
        self.items.retain(|i| i.producto.id != producto_id);
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.subtotal).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn producto(nombre: &str, precio: f64, stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            nombre: nombre.into(),
            descripcion: None,
            precio,
            stock,
            categoria: None,
            talla: None,
            color: None,
            imagen_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn add_recomputes_subtotal() {
        let mut cart = Cart::new();
        let p = producto("Camiseta", 10.0, 5);
        cart.add(p.clone()).unwrap();
        cart.add(p).unwrap();
        assert_eq!(cart.items()[0].cantidad, 2);
        assert_eq!(cart.items()[0].subtotal, 20.0);
        assert_eq!(cart.total(), 20.0);
    }

    #[test]
    fn add_is_capped_by_stock() {
        let mut cart = Cart::new();
        let p = producto("Polo", 15.5, 1);
        cart.add(p.clone()).unwrap();
        let err = cart.add(p).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                nombre: "Polo".into(),
                stock: 1
            }
        );
    }

    #[test]
    fn add_units_accumulates_and_checks_stock() {
        let mut cart = Cart::new();
        let p = producto("Buzo", 25.0, 4);
        cart.add_units(p.clone(), 3).unwrap();
        assert!(cart.add_units(p.clone(), 2).is_err());
        cart.add_units(p, 1).unwrap();
        assert_eq!(cart.items()[0].cantidad, 4);
        assert_eq!(cart.total(), 100.0);
    }

    #[test]
    fn zero_quantity_removes_the_item() {
        let mut cart = Cart::new();
        let p = producto("Gorra", 8.0, 10);
        let id = p.id;
        cart.add(p).unwrap();
        cart.set_quantity(id, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_enforces_stock() {
        let mut cart = Cart::new();
        let p = producto("Pantalón", 30.0, 3);
        let id = p.id;
        cart.add(p).unwrap();
        assert!(cart.set_quantity(id, 4).is_err());
        cart.set_quantity(id, 3).unwrap();
        assert_eq!(cart.total(), 90.0);
    }

    #[test]
    fn mixed_cart_total() {
        let mut cart = Cart::new();
        cart.add_units(producto("P1", 10.0, 5), 2).unwrap();
        cart.add_units(producto("P2", 5.5, 1), 1).unwrap();
        assert_eq!(cart.total(), 25.5);
    }
}
