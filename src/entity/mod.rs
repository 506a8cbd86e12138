pub mod pedido_detalles;
pub mod pedidos;
pub mod productos;
pub mod usuarios;

pub use pedido_detalles::Entity as PedidoDetalles;
pub use pedidos::Entity as Pedidos;
pub use productos::Entity as Productos;
pub use usuarios::Entity as Usuarios;
