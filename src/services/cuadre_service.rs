use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Iterable, QueryFilter};

use crate::entities::{
    caja_entity, movimiento_entity, orden_entity, CategoriaGasto, EstadoOrden, MetodoPago,
    Plataforma, TipoMovimiento,
};
use crate::error::{AppError, AppResult};
use crate::models::{CuadrePlataforma, CuadreReport, GastoPorCategoria, OrdenConDetalle};
use crate::services::comisiones;
use crate::services::orden_service::OrdenService;
use crate::utils::redondear_centavos;

#[derive(Clone)]
pub struct CuadreService {
    db: Arc<DatabaseConnection>,
    ordenes: OrdenService,
}

impl CuadreService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let ordenes = OrdenService::new(db.clone());
        Self { db, ordenes }
    }

    /// Cuadre de una caja abierta o cerrada: junta la caja, su libro de
    /// movimientos y las ordenes de la sucursal dentro de la ventana del
    /// turno, y delega el calculo a [`calcular_cuadre`], que es puro.
    pub async fn cuadre(&self, caja_id: i64) -> AppResult<CuadreReport> {
        let caja = caja_entity::Entity::find_by_id(caja_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Caja {caja_id} no encontrada")))?;

        let movimientos = movimiento_entity::Entity::find()
            .filter(movimiento_entity::Column::CajaId.eq(caja_id))
            .all(self.db.as_ref())
            .await?;

        let fin = caja.cerrada_en.unwrap_or_else(Utc::now);
        let ordenes = orden_entity::Entity::find()
            .filter(orden_entity::Column::SucursalId.eq(caja.sucursal_id))
            .filter(orden_entity::Column::CreatedAt.gte(caja.abierta_en))
            .filter(orden_entity::Column::CreatedAt.lte(fin))
            .all(self.db.as_ref())
            .await?;
        let detalladas = self.ordenes.adjuntar_detalle(ordenes).await?;

        Ok(calcular_cuadre(&caja, &movimientos, &detalladas))
    }
}

#[derive(Default)]
struct AcumuladorPlataforma {
    ordenes: u64,
    total: Decimal,
    total_plataforma: Decimal,
    sobreprecio: Decimal,
    pago_app: Decimal,
    pago_efectivo: Decimal,
}

/// Funcion pura del cuadre. Acumula sin redondear y redondea cada cifra
/// solo al armar el reporte, para no componer errores de redondeo. Las
/// comisiones de plataforma se redondean por plataforma, de forma
/// independiente, como las liquida cada una.
pub fn calcular_cuadre(
    caja: &caja_entity::Model,
    movimientos: &[movimiento_entity::Model],
    ordenes: &[OrdenConDetalle],
) -> CuadreReport {
    let mut depositos = Decimal::ZERO;
    let mut retiros = Decimal::ZERO;
    let mut gastos = Decimal::ZERO;
    let mut gastos_categoria: HashMap<CategoriaGasto, Decimal> = HashMap::new();

    for movimiento in movimientos {
        match movimiento.tipo {
            TipoMovimiento::Deposito => depositos += movimiento.monto,
            TipoMovimiento::Retiro => retiros += movimiento.monto,
            TipoMovimiento::Gasto => {
                gastos += movimiento.monto;
                if let Some(categoria) = movimiento.categoria_gasto {
                    *gastos_categoria.entry(categoria).or_default() += movimiento.monto;
                }
            }
        }
    }

    let mut cobros_efectivo = Decimal::ZERO;
    let mut reembolsos_efectivo = Decimal::ZERO;
    let mut reembolsos_otros = Decimal::ZERO;
    let mut ventas_brutas = Decimal::ZERO;
    let mut descuentos = Decimal::ZERO;
    let mut total_canceladas = Decimal::ZERO;
    let mut total_efectivo = Decimal::ZERO;
    let mut total_tarjeta = Decimal::ZERO;
    let mut total_app = Decimal::ZERO;
    let mut piezas_vendidas: i64 = 0;
    let mut completadas: u64 = 0;
    let mut canceladas: u64 = 0;
    let mut por_plataforma: HashMap<Plataforma, AcumuladorPlataforma> = HashMap::new();

    for detalle in ordenes {
        let orden = &detalle.orden;
        match orden.estado {
            EstadoOrden::Completada => {
                completadas += 1;
                // Renglones historicos importados pueden venir sin subtotal.
                ventas_brutas += orden.subtotal.unwrap_or(orden.total);
                descuentos += orden.descuento;
                piezas_vendidas += detalle
                    .items
                    .iter()
                    .map(|item| i64::from(item.cantidad))
                    .sum::<i64>();

                for pago in &detalle.pagos {
                    match pago.metodo {
                        MetodoPago::Efectivo => {
                            cobros_efectivo += pago.monto;
                            total_efectivo += pago.monto;
                        }
                        MetodoPago::Tarjeta => total_tarjeta += pago.monto,
                        MetodoPago::AppPlataforma => total_app += pago.monto,
                    }
                }

                if let Some(plataforma) = orden.plataforma {
                    let acumulado = por_plataforma.entry(plataforma).or_default();
                    let total_plataforma = orden.total_plataforma.unwrap_or(orden.total);
                    acumulado.ordenes += 1;
                    acumulado.total += orden.total;
                    acumulado.total_plataforma += total_plataforma;
                    acumulado.sobreprecio += (total_plataforma - orden.total).max(Decimal::ZERO);
                    for pago in &detalle.pagos {
                        match pago.metodo {
                            MetodoPago::AppPlataforma => acumulado.pago_app += pago.monto,
                            MetodoPago::Efectivo => acumulado.pago_efectivo += pago.monto,
                            MetodoPago::Tarjeta => {}
                        }
                    }
                }
            }
            EstadoOrden::Cancelada => {
                canceladas += 1;
                total_canceladas += orden.total;
                for pago in &detalle.pagos {
                    if pago.metodo == MetodoPago::Efectivo {
                        reembolsos_efectivo += pago.monto;
                    } else {
                        reembolsos_otros += pago.monto;
                    }
                }
            }
        }
    }

    let efectivo_teorico = caja.fondo_inicial + cobros_efectivo - reembolsos_efectivo + depositos
        - retiros
        - gastos;
    let descuadre = caja
        .efectivo_contado
        .map(|contado| redondear_centavos(contado - efectivo_teorico));

    let comision_tarjeta = redondear_centavos(total_tarjeta * comisiones::tasa_comision_tarjeta());
    let ingreso_neto_tarjeta = redondear_centavos(total_tarjeta) - comision_tarjeta;

    let mut plataformas = Vec::new();
    let mut sobreprecio_plataformas = Decimal::ZERO;
    for plataforma in Plataforma::iter() {
        if let Some(acumulado) = por_plataforma.get(&plataforma) {
            sobreprecio_plataformas += acumulado.sobreprecio;
            plataformas.push(CuadrePlataforma {
                plataforma,
                ordenes: acumulado.ordenes,
                total: redondear_centavos(acumulado.total),
                total_plataforma: redondear_centavos(acumulado.total_plataforma),
                sobreprecio: redondear_centavos(acumulado.sobreprecio),
                pago_app: redondear_centavos(acumulado.pago_app),
                pago_efectivo: redondear_centavos(acumulado.pago_efectivo),
                comision_app: redondear_centavos(
                    acumulado.pago_app * comisiones::tasa_plataforma_app(plataforma),
                ),
                comision_efectivo: redondear_centavos(
                    acumulado.pago_efectivo * comisiones::tasa_plataforma_efectivo(plataforma),
                ),
            });
        }
    }

    let gastos_por_categoria = CategoriaGasto::iter()
        .filter_map(|categoria| {
            gastos_categoria.get(&categoria).map(|monto| GastoPorCategoria {
                categoria,
                monto: redondear_centavos(*monto),
            })
        })
        .collect();

    CuadreReport {
        caja_id: caja.id,
        sucursal_id: caja.sucursal_id,
        estado: caja.estado,
        abierta_en: caja.abierta_en,
        cerrada_en: caja.cerrada_en,
        fondo_inicial: redondear_centavos(caja.fondo_inicial),
        cobros_efectivo: redondear_centavos(cobros_efectivo),
        reembolsos_efectivo: redondear_centavos(reembolsos_efectivo),
        depositos: redondear_centavos(depositos),
        retiros: redondear_centavos(retiros),
        gastos: redondear_centavos(gastos),
        gastos_por_categoria,
        efectivo_teorico: redondear_centavos(efectivo_teorico),
        efectivo_contado: caja.efectivo_contado.map(redondear_centavos),
        descuadre,
        ordenes_completadas: completadas,
        ordenes_canceladas: canceladas,
        ventas_brutas: redondear_centavos(ventas_brutas),
        descuentos: redondear_centavos(descuentos),
        ventas_netas: redondear_centavos(ventas_brutas - descuentos - total_canceladas),
        piezas_vendidas,
        total_efectivo: redondear_centavos(total_efectivo),
        total_tarjeta: redondear_centavos(total_tarjeta),
        total_app_plataforma: redondear_centavos(total_app),
        comision_tarjeta,
        ingreso_neto_tarjeta,
        reembolsos_otros: redondear_centavos(reembolsos_otros),
        plataformas,
        sobreprecio_plataformas: redondear_centavos(sobreprecio_plataformas),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{orden_item_entity, pago_entity, EstadoCaja, EstadoPreparacion};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn caja(fondo: Decimal) -> caja_entity::Model {
        caja_entity::Model {
            id: 1,
            sucursal_id: 1,
            estado: EstadoCaja::Abierta,
            abierta_en: Utc::now() - Duration::hours(6),
            cerrada_en: None,
            fondo_inicial: fondo,
            efectivo_contado: None,
            efectivo_siguiente_turno: None,
            notas: None,
            prefijo_folio: 10,
            contador_folio: 0,
        }
    }

    fn movimiento(tipo: TipoMovimiento, monto: Decimal, categoria: Option<CategoriaGasto>) -> movimiento_entity::Model {
        movimiento_entity::Model {
            id: 0,
            caja_id: 1,
            tipo,
            monto,
            comentario: None,
            categoria_gasto: categoria,
            created_at: Utc::now(),
        }
    }

    struct ParamsOrden {
        estado: EstadoOrden,
        subtotal: Option<Decimal>,
        descuento: Decimal,
        total: Decimal,
        plataforma: Option<Plataforma>,
        total_plataforma: Option<Decimal>,
        pagos: Vec<(MetodoPago, Decimal)>,
        piezas: Vec<i32>,
    }

    fn orden(params: ParamsOrden) -> OrdenConDetalle {
        let orden = orden_entity::Model {
            id: 0,
            sucursal_id: 1,
            folio: 1001,
            empleado_id: None,
            empleado_descuento_id: None,
            plataforma: params.plataforma,
            total_plataforma: params.total_plataforma,
            subtotal: params.subtotal,
            descuento: params.descuento,
            impuesto: dec!(0),
            total: params.total,
            estado: params.estado,
            preparacion: EstadoPreparacion::Entregada,
            nombre_cliente: None,
            notas: None,
            created_at: Utc::now() - Duration::hours(1),
        };
        let items = params
            .piezas
            .iter()
            .map(|cantidad| orden_item_entity::Model {
                id: 0,
                orden_id: 0,
                producto_nombre: "Latte".to_string(),
                cantidad: *cantidad,
                modificadores: serde_json::json!([]),
                subtotal_linea: dec!(0),
                notas: None,
            })
            .collect();
        let pagos = params
            .pagos
            .iter()
            .map(|(metodo, monto)| pago_entity::Model {
                id: 0,
                orden_id: 0,
                metodo: *metodo,
                monto: *monto,
            })
            .collect();
        OrdenConDetalle { orden, items, pagos }
    }

    fn venta_efectivo(total: Decimal) -> OrdenConDetalle {
        orden(ParamsOrden {
            estado: EstadoOrden::Completada,
            subtotal: Some(total),
            descuento: dec!(0),
            total,
            plataforma: None,
            total_plataforma: None,
            pagos: vec![(MetodoPago::Efectivo, total)],
            piezas: vec![1],
        })
    }

    #[test]
    fn efectivo_teorico_de_la_secuencia_clasica() {
        // apertura 1000 -> venta 50 efectivo -> gasto 20 -> retiro 30
        let movimientos = vec![
            movimiento(TipoMovimiento::Gasto, dec!(20), Some(CategoriaGasto::Insumos)),
            movimiento(TipoMovimiento::Retiro, dec!(30), None),
        ];
        let ordenes = vec![venta_efectivo(dec!(50))];

        let reporte = calcular_cuadre(&caja(dec!(1000)), &movimientos, &ordenes);
        assert_eq!(reporte.efectivo_teorico, dec!(1000.00));
        assert_eq!(reporte.cobros_efectivo, dec!(50.00));
        assert_eq!(reporte.gastos, dec!(20.00));
        assert_eq!(reporte.retiros, dec!(30.00));
        assert_eq!(reporte.descuadre, None);
    }

    #[test]
    fn orden_cancelada_cuenta_como_reembolso_y_sale_de_las_ventas() {
        let ordenes = vec![
            venta_efectivo(dec!(100)),
            orden(ParamsOrden {
                estado: EstadoOrden::Cancelada,
                subtotal: Some(dec!(40)),
                descuento: dec!(0),
                total: dec!(40),
                plataforma: None,
                total_plataforma: None,
                pagos: vec![(MetodoPago::Efectivo, dec!(40))],
                piezas: vec![2],
            }),
        ];

        let reporte = calcular_cuadre(&caja(dec!(0)), &[], &ordenes);
        assert_eq!(reporte.cobros_efectivo, dec!(100.00));
        assert_eq!(reporte.reembolsos_efectivo, dec!(40.00));
        assert_eq!(reporte.efectivo_teorico, dec!(60.00));
        // brutas solo de completadas; canceladas restan su total de las netas
        assert_eq!(reporte.ventas_brutas, dec!(100.00));
        assert_eq!(reporte.ventas_netas, dec!(60.00));
        // las piezas de la cancelada no se venden
        assert_eq!(reporte.piezas_vendidas, 1);
        assert_eq!(reporte.ordenes_canceladas, 1);
    }

    #[test]
    fn reembolso_con_tarjeta_no_mueve_efectivo() {
        let ordenes = vec![orden(ParamsOrden {
            estado: EstadoOrden::Cancelada,
            subtotal: Some(dec!(80)),
            descuento: dec!(0),
            total: dec!(80),
            plataforma: None,
            total_plataforma: None,
            pagos: vec![(MetodoPago::Tarjeta, dec!(80))],
            piezas: vec![1],
        })];

        let reporte = calcular_cuadre(&caja(dec!(500)), &[], &ordenes);
        assert_eq!(reporte.reembolsos_efectivo, dec!(0.00));
        assert_eq!(reporte.reembolsos_otros, dec!(80.00));
        assert_eq!(reporte.efectivo_teorico, dec!(500.00));
    }

    #[test]
    fn comision_de_plataforma_sobre_lo_pagado_por_app() {
        // DidiFood: 25% app. total 100, total_plataforma 120, pagado por app.
        let ordenes = vec![orden(ParamsOrden {
            estado: EstadoOrden::Completada,
            subtotal: Some(dec!(100)),
            descuento: dec!(0),
            total: dec!(100),
            plataforma: Some(Plataforma::DidiFood),
            total_plataforma: Some(dec!(120)),
            pagos: vec![(MetodoPago::AppPlataforma, dec!(100))],
            piezas: vec![3],
        })];

        let reporte = calcular_cuadre(&caja(dec!(0)), &[], &ordenes);
        assert_eq!(reporte.plataformas.len(), 1);
        let didi = &reporte.plataformas[0];
        assert_eq!(didi.plataforma, Plataforma::DidiFood);
        assert_eq!(didi.sobreprecio, dec!(20.00));
        // comision sobre lo que transito por el metodo, no sobre total_plataforma
        assert_eq!(didi.comision_app, dec!(25.00));
        assert_eq!(didi.comision_efectivo, dec!(0.00));
        assert_eq!(reporte.sobreprecio_plataformas, dec!(20.00));
        // el pago por app no toca el efectivo
        assert_eq!(reporte.efectivo_teorico, dec!(0.00));
        assert_eq!(reporte.total_app_plataforma, dec!(100.00));
    }

    #[test]
    fn comisiones_por_plataforma_se_redondean_por_separado() {
        let pedido = |plataforma, monto| {
            orden(ParamsOrden {
                estado: EstadoOrden::Completada,
                subtotal: Some(monto),
                descuento: dec!(0),
                total: monto,
                plataforma: Some(plataforma),
                total_plataforma: Some(monto),
                pagos: vec![(MetodoPago::AppPlataforma, monto)],
                piezas: vec![1],
            })
        };
        // 33.33 * 0.28 = 9.3324 -> 9.33 ; 33.33 * 0.25 = 8.3325 -> 8.33
        let ordenes = vec![
            pedido(Plataforma::Rappi, dec!(33.33)),
            pedido(Plataforma::DidiFood, dec!(33.33)),
        ];

        let reporte = calcular_cuadre(&caja(dec!(0)), &[], &ordenes);
        let rappi = reporte
            .plataformas
            .iter()
            .find(|p| p.plataforma == Plataforma::Rappi)
            .unwrap();
        let didi = reporte
            .plataformas
            .iter()
            .find(|p| p.plataforma == Plataforma::DidiFood)
            .unwrap();
        assert_eq!(rappi.comision_app, dec!(9.33));
        assert_eq!(didi.comision_app, dec!(8.33));
    }

    #[test]
    fn comision_de_tarjeta_y_neto() {
        let ordenes = vec![orden(ParamsOrden {
            estado: EstadoOrden::Completada,
            subtotal: Some(dec!(200)),
            descuento: dec!(0),
            total: dec!(200),
            plataforma: None,
            total_plataforma: None,
            pagos: vec![(MetodoPago::Tarjeta, dec!(200))],
            piezas: vec![1],
        })];

        let reporte = calcular_cuadre(&caja(dec!(0)), &[], &ordenes);
        assert_eq!(reporte.total_tarjeta, dec!(200.00));
        assert_eq!(reporte.comision_tarjeta, dec!(7.20));
        assert_eq!(reporte.ingreso_neto_tarjeta, dec!(192.80));
    }

    #[test]
    fn renglon_historico_sin_subtotal_usa_el_total() {
        let ordenes = vec![orden(ParamsOrden {
            estado: EstadoOrden::Completada,
            subtotal: None,
            descuento: dec!(0),
            total: dec!(75),
            plataforma: None,
            total_plataforma: None,
            pagos: vec![(MetodoPago::Efectivo, dec!(75))],
            piezas: vec![1],
        })];

        let reporte = calcular_cuadre(&caja(dec!(0)), &[], &ordenes);
        assert_eq!(reporte.ventas_brutas, dec!(75.00));
    }

    #[test]
    fn descuadre_aparece_con_el_conteo() {
        let mut cerrada = caja(dec!(1000));
        cerrada.estado = EstadoCaja::Cerrada;
        cerrada.cerrada_en = Some(Utc::now());
        cerrada.efectivo_contado = Some(dec!(1040));

        let ordenes = vec![venta_efectivo(dec!(50))];
        let reporte = calcular_cuadre(&cerrada, &[], &ordenes);
        assert_eq!(reporte.efectivo_teorico, dec!(1050.00));
        assert_eq!(reporte.descuadre, Some(dec!(-10.00)));
    }

    #[test]
    fn gastos_se_agrupan_por_categoria() {
        let movimientos = vec![
            movimiento(TipoMovimiento::Gasto, dec!(10), Some(CategoriaGasto::Insumos)),
            movimiento(TipoMovimiento::Gasto, dec!(15), Some(CategoriaGasto::Insumos)),
            movimiento(TipoMovimiento::Gasto, dec!(200), Some(CategoriaGasto::Renta)),
            movimiento(TipoMovimiento::Deposito, dec!(500), None),
        ];

        let reporte = calcular_cuadre(&caja(dec!(0)), &movimientos, &[]);
        assert_eq!(reporte.gastos, dec!(225.00));
        assert_eq!(reporte.depositos, dec!(500.00));
        assert_eq!(reporte.gastos_por_categoria.len(), 2);
        let insumos = reporte
            .gastos_por_categoria
            .iter()
            .find(|g| g.categoria == CategoriaGasto::Insumos)
            .unwrap();
        assert_eq!(insumos.monto, dec!(25.00));
    }

    #[test]
    fn pago_dividido_reparte_por_metodo() {
        let ordenes = vec![orden(ParamsOrden {
            estado: EstadoOrden::Completada,
            subtotal: Some(dec!(90)),
            descuento: dec!(0),
            total: dec!(90),
            plataforma: None,
            total_plataforma: None,
            pagos: vec![
                (MetodoPago::Efectivo, dec!(40)),
                (MetodoPago::Tarjeta, dec!(50)),
            ],
            piezas: vec![2, 1],
        })];

        let reporte = calcular_cuadre(&caja(dec!(100)), &[], &ordenes);
        assert_eq!(reporte.total_efectivo, dec!(40.00));
        assert_eq!(reporte.total_tarjeta, dec!(50.00));
        assert_eq!(reporte.efectivo_teorico, dec!(140.00));
        assert_eq!(reporte.piezas_vendidas, 3);
    }
}
