use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Estado de una caja (sesion de turno).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum EstadoCaja {
    #[sea_orm(string_value = "abierta")]
    Abierta,
    #[sea_orm(string_value = "cerrada")]
    Cerrada,
}

/// Estado financiero de una orden. Una orden cancelada se conserva para
/// auditoria; nunca se borra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum EstadoOrden {
    #[sea_orm(string_value = "completada")]
    Completada,
    #[sea_orm(string_value = "cancelada")]
    Cancelada,
}

/// Estado de preparacion en barra/cocina. Maquina de estados independiente
/// del estado financiero de la orden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum EstadoPreparacion {
    #[sea_orm(string_value = "pendiente")]
    Pendiente,
    #[sea_orm(string_value = "en_preparacion")]
    EnPreparacion,
    #[sea_orm(string_value = "lista")]
    Lista,
    #[sea_orm(string_value = "entregada")]
    Entregada,
}

/// Metodo de pago. Una orden puede traer varios pagos (pago dividido).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum MetodoPago {
    #[sea_orm(string_value = "efectivo")]
    Efectivo,
    #[sea_orm(string_value = "tarjeta")]
    Tarjeta,
    #[sea_orm(string_value = "app_plataforma")]
    AppPlataforma,
}

/// Tipo de movimiento de caja.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum TipoMovimiento {
    #[sea_orm(string_value = "deposito")]
    Deposito,
    #[sea_orm(string_value = "retiro")]
    Retiro,
    #[sea_orm(string_value = "gasto")]
    Gasto,
}

/// Categoria de gasto operativo; obligatoria cuando tipo = gasto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum CategoriaGasto {
    #[sea_orm(string_value = "insumos")]
    Insumos,
    #[sea_orm(string_value = "proveedor")]
    Proveedor,
    #[sea_orm(string_value = "renta")]
    Renta,
    #[sea_orm(string_value = "nomina")]
    Nomina,
    #[sea_orm(string_value = "servicios")]
    Servicios,
    #[sea_orm(string_value = "limpieza")]
    Limpieza,
    #[sea_orm(string_value = "otro")]
    Otro,
}

/// Plataforma de entrega. `None` en la orden significa venta local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum Plataforma {
    #[sea_orm(string_value = "uber_eats")]
    UberEats,
    #[sea_orm(string_value = "rappi")]
    Rappi,
    #[sea_orm(string_value = "didi_food")]
    DidiFood,
}
