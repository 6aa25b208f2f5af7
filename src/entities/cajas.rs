use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::enums::EstadoCaja;

/// Sesion de caja ("turno"). El renglon es el punto de serializacion del
/// efectivo de la sucursal: el folio de ordenes vive aqui (prefijo +
/// contador) y se reinicia con cada apertura.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cajas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sucursal_id: i64,
    pub estado: EstadoCaja,
    pub abierta_en: DateTime<Utc>,
    pub cerrada_en: Option<DateTime<Utc>>,
    pub fondo_inicial: Decimal,
    pub efectivo_contado: Option<Decimal>,
    pub efectivo_siguiente_turno: Option<Decimal>,
    pub notas: Option<String>,
    pub prefijo_folio: i32,
    pub contador_folio: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sucursales::Entity",
        from = "Column::SucursalId",
        to = "super::sucursales::Column::Id"
    )]
    Sucursal,
    #[sea_orm(has_many = "super::movimientos_caja::Entity")]
    Movimientos,
}

impl Related<super::sucursales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sucursal.def()
    }
}

impl Related<super::movimientos_caja::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movimientos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
