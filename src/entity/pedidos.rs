use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pedidos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub fecha_emision: DateTimeWithTimeZone,
    pub estado: String,
    pub total: f64,
    pub observaciones: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::usuarios::Entity",
        from = "Column::UsuarioId",
        to = "super::usuarios::Column::Id"
    )]
    Usuarios,
    #[sea_orm(has_many = "super::pedido_detalles::Entity")]
    PedidoDetalles,
}

impl Related<super::usuarios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuarios.def()
    }
}

impl Related<super::pedido_detalles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PedidoDetalles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
