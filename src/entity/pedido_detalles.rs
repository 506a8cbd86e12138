use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pedido_detalles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub pedido_id: Uuid,
    pub producto_id: Uuid,
    pub cantidad: i32,
    pub precio_unitario: f64,
    pub subtotal: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pedidos::Entity",
        from = "Column::PedidoId",
        to = "super::pedidos::Column::Id"
    )]
    Pedidos,
    #[sea_orm(
        belongs_to = "super::productos::Entity",
        from = "Column::ProductoId",
        to = "super::productos::Column::Id"
    )]
    Productos,
}

impl Related<super::pedidos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pedidos.def()
    }
}

impl Related<super::productos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Productos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
