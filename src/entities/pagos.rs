use sea_orm::entity::prelude::*;

use super::enums::MetodoPago;

/// Pago de una orden. La suma de pagos no tiene que igualar el total cuando
/// existe sobreprecio de plataforma (el pago por app puede excederlo).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pagos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub orden_id: i64,
    pub metodo: MetodoPago,
    pub monto: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ordenes::Entity",
        from = "Column::OrdenId",
        to = "super::ordenes::Column::Id"
    )]
    Orden,
}

impl Related<super::ordenes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orden.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
