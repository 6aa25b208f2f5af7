use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    orden_entity, orden_item_entity, pago_entity, EstadoOrden, EstadoPreparacion, MetodoPago,
    Plataforma,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Modificador {
    pub nombre: String,
    pub precio_extra: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemOrdenInput {
    pub producto_nombre: String,
    pub cantidad: i32,
    #[serde(default)]
    pub modificadores: Vec<Modificador>,
    pub subtotal_linea: Decimal,
    pub notas: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PagoInput {
    pub metodo: MetodoPago,
    pub monto: Decimal,
}

/// Carga de `POST /ordenes`. Las ordenes reenviadas desde la cola offline
/// llegan por aqui igual que las normales, con su marca de tiempo original
/// embebida en `notas`; el motor no deduplica por contenido.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CrearOrdenRequest {
    pub sucursal_id: i64,
    pub empleado_id: Option<i64>,
    /// Empleado cuyo esquema de descuento se aplico, si fue descuento de
    /// empleado (cambia la base del impuesto).
    pub empleado_descuento_id: Option<i64>,
    pub plataforma: Option<Plataforma>,
    pub total_plataforma: Option<Decimal>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub descuento: Decimal,
    /// Si el terminal los omite, el servidor los calcula con la tasa de IVA
    /// vigente y la regla de base segun el tipo de descuento.
    pub impuesto: Option<Decimal>,
    pub total: Option<Decimal>,
    pub items: Vec<ItemOrdenInput>,
    pub pagos: Vec<PagoInput>,
    pub nombre_cliente: Option<String>,
    pub notas: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReembolsoRequest {
    pub orden_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreparacionRequest {
    pub preparacion: EstadoPreparacion,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrdenesQuery {
    pub sucursal_id: Option<i64>,
    /// Fecha inicial inclusive, RFC 3339.
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub limite: Option<u64>,
}

/// Orden con sus renglones hijos, tal como la consume el cuadre y la API.
#[derive(Debug, Clone)]
pub struct OrdenConDetalle {
    pub orden: orden_entity::Model,
    pub items: Vec<orden_item_entity::Model>,
    pub pagos: Vec<pago_entity::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemOrdenResponse {
    pub id: i64,
    pub producto_nombre: String,
    pub cantidad: i32,
    pub modificadores: Vec<Modificador>,
    pub subtotal_linea: Decimal,
    pub notas: Option<String>,
}

impl From<orden_item_entity::Model> for ItemOrdenResponse {
    fn from(m: orden_item_entity::Model) -> Self {
        let modificadores = serde_json::from_value(m.modificadores).unwrap_or_default();
        Self {
            id: m.id,
            producto_nombre: m.producto_nombre,
            cantidad: m.cantidad,
            modificadores,
            subtotal_linea: m.subtotal_linea,
            notas: m.notas,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PagoResponse {
    pub id: i64,
    pub metodo: MetodoPago,
    pub monto: Decimal,
}

impl From<pago_entity::Model> for PagoResponse {
    fn from(m: pago_entity::Model) -> Self {
        Self {
            id: m.id,
            metodo: m.metodo,
            monto: m.monto,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrdenResponse {
    pub id: i64,
    pub sucursal_id: i64,
    pub folio: i32,
    pub empleado_id: Option<i64>,
    pub empleado_descuento_id: Option<i64>,
    pub plataforma: Option<Plataforma>,
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
    pub items: Vec<ItemOrdenResponse>,
    pub pagos: Vec<PagoResponse>,
}

impl From<OrdenConDetalle> for OrdenResponse {
    fn from(d: OrdenConDetalle) -> Self {
        let o = d.orden;
        Self {
            id: o.id,
            sucursal_id: o.sucursal_id,
            folio: o.folio,
            empleado_id: o.empleado_id,
            empleado_descuento_id: o.empleado_descuento_id,
            plataforma: o.plataforma,
            total_plataforma: o.total_plataforma,
            subtotal: o.subtotal,
            descuento: o.descuento,
            impuesto: o.impuesto,
            total: o.total,
            estado: o.estado,
            preparacion: o.preparacion,
            nombre_cliente: o.nombre_cliente,
            notas: o.notas,
            created_at: o.created_at,
            items: d.items.into_iter().map(Into::into).collect(),
            pagos: d.pagos.into_iter().map(Into::into).collect(),
        }
    }
}
