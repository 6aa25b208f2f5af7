use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    orden_entity, orden_item_entity, pago_entity, EstadoOrden, EstadoPreparacion,
};
use crate::error::{AppError, AppResult};
use crate::models::{CrearOrdenRequest, OrdenConDetalle};
use crate::services::caja_service::CajaService;
use crate::utils::{calcular_totales, redondear_centavos};

const LIMITE_DEFAULT: u64 = 100;
const LIMITE_MAXIMO: u64 = 500;

#[derive(Clone)]
pub struct OrdenService {
    db: Arc<DatabaseConnection>,
    cajas: CajaService,
}

impl OrdenService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let cajas = CajaService::new(db.clone());
        Self { db, cajas }
    }

    /// Crea una orden con sus items y pagos en una sola transaccion: o se
    /// persiste completa o no queda nada visible. El folio se toma de la
    /// caja abierta de la sucursal; sin caja abierta la venta procede en
    /// modo degradado con folio derivado del reloj.
    pub async fn crear_orden(&self, req: CrearOrdenRequest) -> AppResult<OrdenConDetalle> {
        let (impuesto, total) = Self::validar(&req)?;

        let folio = match self.cajas.caja_abierta(req.sucursal_id).await? {
            Some(caja) => self.cajas.siguiente_folio(&caja).await?,
            None => {
                log::warn!(
                    "Sucursal {} sin caja abierta; folio degradado por reloj",
                    req.sucursal_id
                );
                CajaService::folio_degradado()
            }
        };

        let txn = self.db.begin().await?;

        let orden = orden_entity::ActiveModel {
            sucursal_id: Set(req.sucursal_id),
            folio: Set(folio),
            empleado_id: Set(req.empleado_id),
            empleado_descuento_id: Set(req.empleado_descuento_id),
            plataforma: Set(req.plataforma),
            total_plataforma: Set(req.total_plataforma),
            subtotal: Set(Some(req.subtotal)),
            descuento: Set(req.descuento),
            impuesto: Set(impuesto),
            total: Set(total),
            estado: Set(EstadoOrden::Completada),
            preparacion: Set(EstadoPreparacion::Pendiente),
            nombre_cliente: Set(req.nombre_cliente),
            notas: Set(req.notas),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let modelo = orden_item_entity::ActiveModel {
                orden_id: Set(orden.id),
                producto_nombre: Set(item.producto_nombre.clone()),
                cantidad: Set(item.cantidad),
                modificadores: Set(serde_json::to_value(&item.modificadores)?),
                subtotal_linea: Set(item.subtotal_linea),
                notas: Set(item.notas.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(modelo);
        }

        let mut pagos = Vec::with_capacity(req.pagos.len());
        for pago in &req.pagos {
            let modelo = pago_entity::ActiveModel {
                orden_id: Set(orden.id),
                metodo: Set(pago.metodo),
                monto: Set(pago.monto),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            pagos.push(modelo);
        }

        txn.commit().await?;

        log::info!(
            "Orden {} (folio {:04}) creada en sucursal {} por {}",
            orden.id,
            orden.folio,
            orden.sucursal_id,
            orden.total
        );
        Ok(OrdenConDetalle { orden, items, pagos })
    }

    fn validar(req: &CrearOrdenRequest) -> AppResult<(Decimal, Decimal)> {
        if req.sucursal_id <= 0 {
            return Err(AppError::ValidationError("Falta sucursal_id".to_string()));
        }
        if req.items.is_empty() {
            return Err(AppError::ValidationError(
                "La orden debe llevar al menos un item".to_string(),
            ));
        }
        if req.pagos.is_empty() {
            return Err(AppError::ValidationError(
                "La orden debe llevar al menos un pago".to_string(),
            ));
        }
        if req.items.iter().any(|i| i.cantidad <= 0) {
            return Err(AppError::ValidationError(
                "Cada item requiere cantidad mayor a cero".to_string(),
            ));
        }
        if req.pagos.iter().any(|p| p.monto <= Decimal::ZERO) {
            return Err(AppError::ValidationError(
                "Cada pago requiere monto mayor a cero".to_string(),
            ));
        }
        if req.subtotal < Decimal::ZERO || req.descuento < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Subtotal y descuento no pueden ser negativos".to_string(),
            ));
        }

        // El terminal puede mandar impuesto/total ya calculados (se verifica
        // el invariante al centavo) u omitirlos para que el servidor los
        // derive con la regla de base gravable segun el tipo de descuento.
        let (impuesto, total) = match (req.impuesto, req.total) {
            (Some(impuesto), Some(total)) => {
                let esperado = redondear_centavos(req.subtotal - req.descuento + impuesto);
                if total != esperado {
                    return Err(AppError::ValidationError(format!(
                        "Total inconsistente: se esperaba {esperado}, llego {total}"
                    )));
                }
                (impuesto, total)
            }
            (Some(impuesto), None) => {
                let total = redondear_centavos(req.subtotal - req.descuento + impuesto);
                (impuesto, total)
            }
            (None, declarado) => {
                let totales = calcular_totales(
                    req.subtotal,
                    req.descuento,
                    req.empleado_descuento_id.is_some(),
                );
                if let Some(total) = declarado {
                    if total != totales.total {
                        return Err(AppError::ValidationError(format!(
                            "Total inconsistente: se esperaba {}, llego {total}",
                            totales.total
                        )));
                    }
                }
                (totales.impuesto, totales.total)
            }
        };

        if let Some(total_plataforma) = req.total_plataforma {
            if req.plataforma.is_none() {
                return Err(AppError::ValidationError(
                    "total_plataforma requiere plataforma".to_string(),
                ));
            }
            if total_plataforma < total {
                return Err(AppError::ValidationError(
                    "total_plataforma no puede ser menor al total".to_string(),
                ));
            }
        }

        Ok((impuesto, total))
    }

    /// Cancela (reembolsa) una orden. Soft-delete: items y pagos quedan
    /// para auditoria; el cuadre trata sus pagos en efectivo como
    /// reembolsos y excluye la orden del ingreso.
    pub async fn reembolsar(&self, orden_id: i64) -> AppResult<OrdenConDetalle> {
        let resultado = orden_entity::Entity::update_many()
            .col_expr(orden_entity::Column::Estado, Expr::value(EstadoOrden::Cancelada))
            .filter(orden_entity::Column::Id.eq(orden_id))
            .filter(orden_entity::Column::Estado.eq(EstadoOrden::Completada))
            .exec(self.db.as_ref())
            .await?;

        if resultado.rows_affected == 0 {
            return match orden_entity::Entity::find_by_id(orden_id).one(self.db.as_ref()).await? {
                None => Err(AppError::NotFound(format!("Orden {orden_id} no encontrada"))),
                Some(_) => Err(AppError::ConflictError(
                    "La orden ya fue cancelada".to_string(),
                )),
            };
        }

        log::info!("Orden {orden_id} cancelada (reembolso)");
        self.obtener(orden_id).await
    }

    /// Cambia el estado de preparacion (cocina/barra). Maquina independiente
    /// del estado financiero; el valor ya llego tipado, aqui solo se
    /// persiste.
    pub async fn actualizar_preparacion(
        &self,
        orden_id: i64,
        preparacion: EstadoPreparacion,
    ) -> AppResult<orden_entity::Model> {
        let resultado = orden_entity::Entity::update_many()
            .col_expr(orden_entity::Column::Preparacion, Expr::value(preparacion))
            .filter(orden_entity::Column::Id.eq(orden_id))
            .exec(self.db.as_ref())
            .await?;

        if resultado.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Orden {orden_id} no encontrada")));
        }

        orden_entity::Entity::find_by_id(orden_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Orden {orden_id} no encontrada")))
    }

    pub async fn obtener(&self, orden_id: i64) -> AppResult<OrdenConDetalle> {
        let orden = orden_entity::Entity::find_by_id(orden_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Orden {orden_id} no encontrada")))?;

        let items = orden_item_entity::Entity::find()
            .filter(orden_item_entity::Column::OrdenId.eq(orden_id))
            .all(self.db.as_ref())
            .await?;
        let pagos = pago_entity::Entity::find()
            .filter(pago_entity::Column::OrdenId.eq(orden_id))
            .all(self.db.as_ref())
            .await?;

        Ok(OrdenConDetalle { orden, items, pagos })
    }

    pub async fn listar(
        &self,
        sucursal_id: Option<i64>,
        fecha_inicio: Option<chrono::DateTime<Utc>>,
        fecha_fin: Option<chrono::DateTime<Utc>>,
        limite: Option<u64>,
    ) -> AppResult<Vec<OrdenConDetalle>> {
        let mut consulta = orden_entity::Entity::find();
        if let Some(sucursal) = sucursal_id {
            consulta = consulta.filter(orden_entity::Column::SucursalId.eq(sucursal));
        }
        if let Some(inicio) = fecha_inicio {
            consulta = consulta.filter(orden_entity::Column::CreatedAt.gte(inicio));
        }
        if let Some(fin) = fecha_fin {
            consulta = consulta.filter(orden_entity::Column::CreatedAt.lte(fin));
        }

        let limite = limite.unwrap_or(LIMITE_DEFAULT).min(LIMITE_MAXIMO);
        let ordenes = consulta
            .order_by_desc(orden_entity::Column::CreatedAt)
            .limit(limite)
            .all(self.db.as_ref())
            .await?;

        self.adjuntar_detalle(ordenes).await
    }

    /// Lecturas en lote de items y pagos para un conjunto de ordenes.
    pub(crate) async fn adjuntar_detalle(
        &self,
        ordenes: Vec<orden_entity::Model>,
    ) -> AppResult<Vec<OrdenConDetalle>> {
        if ordenes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = ordenes.iter().map(|o| o.id).collect();

        let mut items_por_orden: HashMap<i64, Vec<orden_item_entity::Model>> = HashMap::new();
        for item in orden_item_entity::Entity::find()
            .filter(orden_item_entity::Column::OrdenId.is_in(ids.clone()))
            .all(self.db.as_ref())
            .await?
        {
            items_por_orden.entry(item.orden_id).or_default().push(item);
        }

        let mut pagos_por_orden: HashMap<i64, Vec<pago_entity::Model>> = HashMap::new();
        for pago in pago_entity::Entity::find()
            .filter(pago_entity::Column::OrdenId.is_in(ids))
            .all(self.db.as_ref())
            .await?
        {
            pagos_por_orden.entry(pago.orden_id).or_default().push(pago);
        }

        Ok(ordenes
            .into_iter()
            .map(|orden| {
                let items = items_por_orden.remove(&orden.id).unwrap_or_default();
                let pagos = pagos_por_orden.remove(&orden.id).unwrap_or_default();
                OrdenConDetalle { orden, items, pagos }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{caja_entity, EstadoCaja, MetodoPago, Plataforma};
    use crate::models::{ItemOrdenInput, PagoInput};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn base_request() -> CrearOrdenRequest {
        CrearOrdenRequest {
            sucursal_id: 1,
            empleado_id: None,
            empleado_descuento_id: None,
            plataforma: None,
            total_plataforma: None,
            subtotal: dec!(35),
            descuento: dec!(0),
            impuesto: Some(dec!(0)),
            total: Some(dec!(35)),
            items: vec![
                ItemOrdenInput {
                    producto_nombre: "Latte matcha".to_string(),
                    cantidad: 2,
                    modificadores: vec![],
                    subtotal_linea: dec!(20),
                    notas: None,
                },
                ItemOrdenInput {
                    producto_nombre: "Te de jazmin".to_string(),
                    cantidad: 1,
                    modificadores: vec![],
                    subtotal_linea: dec!(15),
                    notas: None,
                },
            ],
            pagos: vec![PagoInput {
                metodo: MetodoPago::Efectivo,
                monto: dec!(35),
            }],
            nombre_cliente: None,
            notas: None,
        }
    }

    async fn esperar_validacion(req: CrearOrdenRequest) -> AppError {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        OrdenService::new(Arc::new(db)).crear_orden(req).await.unwrap_err()
    }

    #[tokio::test]
    async fn orden_sin_items_es_rechazada() {
        let mut req = base_request();
        req.items.clear();
        assert!(matches!(
            esperar_validacion(req).await,
            AppError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn orden_sin_pagos_es_rechazada() {
        let mut req = base_request();
        req.pagos.clear();
        assert!(matches!(
            esperar_validacion(req).await,
            AppError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn total_que_rompe_el_invariante_es_rechazado() {
        let mut req = base_request();
        req.total = Some(dec!(99));
        assert!(matches!(
            esperar_validacion(req).await,
            AppError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn total_plataforma_menor_al_total_es_rechazado() {
        let mut req = base_request();
        req.plataforma = Some(Plataforma::Rappi);
        req.total_plataforma = Some(dec!(30));
        assert!(matches!(
            esperar_validacion(req).await,
            AppError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn total_plataforma_sin_plataforma_es_rechazado() {
        let mut req = base_request();
        req.total_plataforma = Some(dec!(40));
        assert!(matches!(
            esperar_validacion(req).await,
            AppError::ValidationError(_)
        ));
    }

    #[test]
    fn impuesto_omitido_usa_la_regla_de_base_por_tipo_de_descuento() {
        // Descuento de empleado: base gravable completa.
        let mut req = base_request();
        req.subtotal = dec!(100);
        req.descuento = dec!(10);
        req.impuesto = None;
        req.total = None;
        req.empleado_descuento_id = Some(5);
        let (impuesto, total) = OrdenService::validar(&req).unwrap();
        assert_eq!(impuesto, dec!(16.00));
        assert_eq!(total, dec!(106.00));

        // Descuento manual: base descontada.
        req.empleado_descuento_id = None;
        let (impuesto, total) = OrdenService::validar(&req).unwrap();
        assert_eq!(impuesto, dec!(14.40));
        assert_eq!(total, dec!(104.40));
    }

    #[tokio::test]
    async fn crear_orden_regresa_el_detalle_completo() {
        let caja = caja_entity::Model {
            id: 7,
            sucursal_id: 1,
            estado: EstadoCaja::Abierta,
            abierta_en: Utc::now(),
            cerrada_en: None,
            fondo_inicial: dec!(1000),
            efectivo_contado: None,
            efectivo_siguiente_turno: None,
            notas: None,
            prefijo_folio: 42,
            contador_folio: 0,
        };
        let orden = orden_entity::Model {
            id: 55,
            sucursal_id: 1,
            folio: 4201,
            empleado_id: None,
            empleado_descuento_id: None,
            plataforma: None,
            total_plataforma: None,
            subtotal: Some(dec!(35)),
            descuento: dec!(0),
            impuesto: dec!(0),
            total: dec!(35),
            estado: EstadoOrden::Completada,
            preparacion: EstadoPreparacion::Pendiente,
            nombre_cliente: None,
            notas: None,
            created_at: Utc::now(),
        };
        let item = |id, cantidad, subtotal_linea, nombre: &str| orden_item_entity::Model {
            id,
            orden_id: 55,
            producto_nombre: nombre.to_string(),
            cantidad,
            modificadores: serde_json::json!([]),
            subtotal_linea,
            notas: None,
        };
        let pago = pago_entity::Model {
            id: 1,
            orden_id: 55,
            metodo: MetodoPago::Efectivo,
            monto: dec!(35),
        };

        // caja abierta -> folio -> insert orden -> items -> pago
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![caja]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![orden]])
            .append_query_results([vec![item(1, 2, dec!(20), "Latte matcha")]])
            .append_query_results([vec![item(2, 1, dec!(15), "Te de jazmin")]])
            .append_query_results([vec![pago]])
            .into_connection();

        let detalle = OrdenService::new(Arc::new(db))
            .crear_orden(base_request())
            .await
            .unwrap();

        assert_eq!(detalle.orden.folio, 4201);
        let suma_items: Decimal = detalle.items.iter().map(|i| i.subtotal_linea).sum();
        assert_eq!(suma_items, detalle.orden.subtotal.unwrap());
        let suma_pagos: Decimal = detalle.pagos.iter().map(|p| p.monto).sum();
        assert_eq!(suma_pagos, detalle.orden.total);
    }

    #[test]
    fn las_sumas_del_detalle_reproducen_el_subtotal() {
        let req = base_request();
        let suma: Decimal = req.items.iter().map(|i| i.subtotal_linea).sum();
        assert_eq!(suma, req.subtotal);
        let pagos: Decimal = req.pagos.iter().map(|p| p.monto).sum();
        assert_eq!(pagos, req.total.unwrap());
    }
}
