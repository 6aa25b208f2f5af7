use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::enums::{CategoriaGasto, TipoMovimiento};

/// Asiento del libro de caja. Solo se agrega; nunca se muta ni se borra.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movimientos_caja")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub caja_id: i64,
    pub tipo: TipoMovimiento,
    pub monto: Decimal,
    pub comentario: Option<String>,
    pub categoria_gasto: Option<CategoriaGasto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cajas::Entity",
        from = "Column::CajaId",
        to = "super::cajas::Column::Id"
    )]
    Caja,
}

impl Related<super::cajas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Caja.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
