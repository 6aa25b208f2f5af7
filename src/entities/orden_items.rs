use sea_orm::entity::prelude::*;

/// Linea de una orden. `producto_nombre` queda congelado al momento de la
/// venta y `modificadores` es una lista JSON de `{nombre, precio_extra}`.
/// Inmutable una vez creada.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orden_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub orden_id: i64,
    pub producto_nombre: String,
    pub cantidad: i32,
    pub modificadores: Json,
    pub subtotal_linea: Decimal,
    pub notas: Option<String>,
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
