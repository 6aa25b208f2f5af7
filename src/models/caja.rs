use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{caja_entity, EstadoCaja};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AbrirCajaRequest {
    pub sucursal_id: i64,
    pub fondo_inicial: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CerrarCajaRequest {
    pub caja_id: i64,
    pub efectivo_contado: Decimal,
    pub notas: Option<String>,
    /// Efectivo que se deja en el cajon para el siguiente turno.
    pub efectivo_siguiente_turno: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsultaCajaQuery {
    pub sucursal_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CuadreQuery {
    pub caja_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MovimientosQuery {
    pub caja_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CajaResponse {
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

impl From<caja_entity::Model> for CajaResponse {
    fn from(m: caja_entity::Model) -> Self {
        Self {
            id: m.id,
            sucursal_id: m.sucursal_id,
            estado: m.estado,
            abierta_en: m.abierta_en,
            cerrada_en: m.cerrada_en,
            fondo_inicial: m.fondo_inicial,
            efectivo_contado: m.efectivo_contado,
            efectivo_siguiente_turno: m.efectivo_siguiente_turno,
            notas: m.notas,
            prefijo_folio: m.prefijo_folio,
            contador_folio: m.contador_folio,
        }
    }
}

/// Respuesta de `GET /caja`: la caja abierta, o si no hay, el efectivo que
/// dejo el turno anterior para prellenar la apertura.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConsultaCajaResponse {
    pub caja: Option<CajaResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efectivo_siguiente_turno: Option<Decimal>,
}
