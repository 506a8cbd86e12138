use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: f64,
    pub stock: i32,
    pub categoria: Option<String>,
    pub talla: Option<String>,
    pub color: Option<String>,
    pub imagen_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pedido_detalles::Entity")]
    PedidoDetalles,
}

impl Related<super::pedido_detalles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PedidoDetalles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
