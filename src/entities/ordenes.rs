use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::enums::{EstadoOrden, EstadoPreparacion, Plataforma};

/// Orden vendida. `estado` (verdad financiera) y `preparacion` (verdad
/// operativa) son dos maquinas de estados independientes sobre el mismo
/// renglon. `subtotal` es nullable por renglones historicos importados que
/// solo traian total.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ordenes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sucursal_id: i64,
    /// Folio de 4 digitos para mostrador; unico solo dentro del turno.
    pub folio: i32,
    pub empleado_id: Option<i64>,
    pub empleado_descuento_id: Option<i64>,
    pub plataforma: Option<Plataforma>,
    /// Lo que la plataforma cobra al cliente; puede exceder `total`.
    pub total_plataforma: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub descuento: Decimal,
    pub impuesto: Decimal,
    pub total: Decimal,
    pub estado: EstadoOrden,
    pub preparacion: EstadoPreparacion,
    pub nombre_cliente: Option<String>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sucursales::Entity",
        from = "Column::SucursalId",
        to = "super::sucursales::Column::Id"
    )]
    Sucursal,
    #[sea_orm(has_many = "super::orden_items::Entity")]
    Items,
    #[sea_orm(has_many = "super::pagos::Entity")]
    Pagos,
}

impl Related<super::sucursales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sucursal.def()
    }
}

impl Related<super::orden_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::pagos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pagos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
