use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{CategoriaGasto, EstadoCaja, Plataforma};

/// Reporte de cuadre de una caja (abierta o cerrada). Todos los montos ya
/// vienen redondeados a centavos; la acumulacion interna se hace sin
/// redondear.
#[derive(Debug, Serialize, ToSchema)]
pub struct CuadreReport {
    pub caja_id: i64,
    pub sucursal_id: i64,
    pub estado: EstadoCaja,
    pub abierta_en: DateTime<Utc>,
    pub cerrada_en: Option<DateTime<Utc>>,

    // Efectivo
    pub fondo_inicial: Decimal,
    pub cobros_efectivo: Decimal,
    pub reembolsos_efectivo: Decimal,
    pub depositos: Decimal,
    pub retiros: Decimal,
    pub gastos: Decimal,
    pub gastos_por_categoria: Vec<GastoPorCategoria>,
    pub efectivo_teorico: Decimal,
    pub efectivo_contado: Option<Decimal>,
    /// `efectivo_contado - efectivo_teorico`; nulo mientras la caja siga
    /// abierta y no haya conteo.
    pub descuadre: Option<Decimal>,

    // Ventas
    pub ordenes_completadas: u64,
    pub ordenes_canceladas: u64,
    pub ventas_brutas: Decimal,
    pub descuentos: Decimal,
    pub ventas_netas: Decimal,
    pub piezas_vendidas: i64,

    // Por metodo de pago (solo ordenes completadas)
    pub total_efectivo: Decimal,
    pub total_tarjeta: Decimal,
    pub total_app_plataforma: Decimal,
    pub comision_tarjeta: Decimal,
    pub ingreso_neto_tarjeta: Decimal,

    /// Reembolsos con tarjeta o app de ordenes canceladas. Se reportan pero
    /// no mueven efectivo fisico ni se liquidan con el procesador
    /// (limitacion conocida: no se modela la devolucion diferida).
    pub reembolsos_otros: Decimal,

    // Plataformas de entrega
    pub plataformas: Vec<CuadrePlataforma>,
    /// Dinero en caja que economicamente pertenece a las plataformas.
    pub sobreprecio_plataformas: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GastoPorCategoria {
    pub categoria: CategoriaGasto,
    pub monto: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CuadrePlataforma {
    pub plataforma: Plataforma,
    pub ordenes: u64,
    pub total: Decimal,
    pub total_plataforma: Decimal,
    pub sobreprecio: Decimal,
    pub pago_app: Decimal,
    pub pago_efectivo: Decimal,
    /// Comisiones redondeadas por plataforma de forma independiente, como
    /// las liquida cada plataforma.
    pub comision_app: Decimal,
    pub comision_efectivo: Decimal,
}
