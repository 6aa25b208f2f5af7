use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sucursales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub nombre: String,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cajas::Entity")]
    Cajas,
    #[sea_orm(has_many = "super::ordenes::Entity")]
    Ordenes,
}

impl Related<super::cajas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cajas.def()
    }
}

impl Related<super::ordenes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ordenes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
