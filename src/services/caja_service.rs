use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{caja_entity, sucursal_entity, EstadoCaja};
use crate::error::{AppError, AppResult};

/// Resultado de una apertura. La apertura concurrente desde dos terminales
/// no es un error del sistema: la segunda recibe la caja ya existente.
#[derive(Debug)]
pub enum AperturaCaja {
    Creada(caja_entity::Model),
    YaAbierta(caja_entity::Model),
}

#[derive(Clone)]
pub struct CajaService {
    db: Arc<DatabaseConnection>,
}

impl CajaService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Abre la caja de una sucursal con el fondo inicial indicado.
    ///
    /// La lectura previa solo sirve para responder con la caja existente;
    /// la garantia real de "a lo mas una abierta por sucursal" es el indice
    /// parcial unico `ux_cajas_sucursal_abierta`. Si dos terminales insertan
    /// a la vez, la perdedora resuelve el error de unicidad releyendo.
    pub async fn abrir_caja(
        &self,
        sucursal_id: i64,
        fondo_inicial: Decimal,
    ) -> AppResult<AperturaCaja> {
        if fondo_inicial < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "El fondo inicial no puede ser negativo".to_string(),
            ));
        }

        let sucursal = sucursal_entity::Entity::find_by_id(sucursal_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sucursal {sucursal_id} no existe")))?;
        if !sucursal.activa {
            return Err(AppError::ValidationError(format!(
                "La sucursal {} esta inactiva",
                sucursal.nombre
            )));
        }

        if let Some(abierta) = self.caja_abierta(sucursal_id).await? {
            return Ok(AperturaCaja::YaAbierta(abierta));
        }

        let nueva = caja_entity::ActiveModel {
            sucursal_id: Set(sucursal_id),
            estado: Set(EstadoCaja::Abierta),
            abierta_en: Set(Utc::now()),
            cerrada_en: Set(None),
            fondo_inicial: Set(fondo_inicial),
            efectivo_contado: Set(None),
            efectivo_siguiente_turno: Set(None),
            notas: Set(None),
            prefijo_folio: Set(rand::thread_rng().gen_range(10..=99)),
            contador_folio: Set(0),
            ..Default::default()
        };

        match nueva.insert(self.db.as_ref()).await {
            Ok(caja) => {
                log::info!(
                    "Caja {} abierta en sucursal {} con fondo {}",
                    caja.id,
                    sucursal_id,
                    caja.fondo_inicial
                );
                Ok(AperturaCaja::Creada(caja))
            }
            Err(err) => {
                // Carrera contra otra terminal: el indice unico rechazo el
                // insert. Releer resuelve a favor de la caja ganadora.
                if let Some(abierta) = self.caja_abierta(sucursal_id).await? {
                    return Ok(AperturaCaja::YaAbierta(abierta));
                }
                Err(err.into())
            }
        }
    }

    pub async fn caja_abierta(&self, sucursal_id: i64) -> AppResult<Option<caja_entity::Model>> {
        let caja = caja_entity::Entity::find()
            .filter(caja_entity::Column::SucursalId.eq(sucursal_id))
            .filter(caja_entity::Column::Estado.eq(EstadoCaja::Abierta))
            .one(self.db.as_ref())
            .await?;
        Ok(caja)
    }

    /// Ultima caja cerrada de la sucursal; su `efectivo_siguiente_turno`
    /// prellena la apertura siguiente.
    pub async fn ultima_cerrada(&self, sucursal_id: i64) -> AppResult<Option<caja_entity::Model>> {
        let caja = caja_entity::Entity::find()
            .filter(caja_entity::Column::SucursalId.eq(sucursal_id))
            .filter(caja_entity::Column::Estado.eq(EstadoCaja::Cerrada))
            .order_by_desc(caja_entity::Column::CerradaEn)
            .one(self.db.as_ref())
            .await?;
        Ok(caja)
    }

    pub async fn obtener(&self, caja_id: i64) -> AppResult<caja_entity::Model> {
        caja_entity::Entity::find_by_id(caja_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Caja {caja_id} no encontrada")))
    }

    /// Cierra la caja: sella el conteo y la congela. Cerrar dos veces falla
    /// con Conflict sin tocar el conteo original.
    pub async fn cerrar_caja(
        &self,
        caja_id: i64,
        efectivo_contado: Decimal,
        notas: Option<String>,
        efectivo_siguiente_turno: Option<Decimal>,
    ) -> AppResult<caja_entity::Model> {
        if efectivo_contado < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "El efectivo contado no puede ser negativo".to_string(),
            ));
        }

        let resultado = caja_entity::Entity::update_many()
            .col_expr(caja_entity::Column::Estado, Expr::value(EstadoCaja::Cerrada))
            .col_expr(caja_entity::Column::CerradaEn, Expr::value(Some(Utc::now())))
            .col_expr(
                caja_entity::Column::EfectivoContado,
                Expr::value(Some(efectivo_contado)),
            )
            .col_expr(
                caja_entity::Column::EfectivoSiguienteTurno,
                Expr::value(efectivo_siguiente_turno),
            )
            .col_expr(caja_entity::Column::Notas, Expr::value(notas))
            .filter(caja_entity::Column::Id.eq(caja_id))
            .filter(caja_entity::Column::Estado.eq(EstadoCaja::Abierta))
            .exec(self.db.as_ref())
            .await?;

        if resultado.rows_affected == 0 {
            // O no existe, o ya estaba cerrada; distinguir para el mensaje.
            return match caja_entity::Entity::find_by_id(caja_id).one(self.db.as_ref()).await? {
                None => Err(AppError::NotFound(format!("Caja {caja_id} no encontrada"))),
                Some(_) => Err(AppError::ConflictError(
                    "La caja ya esta cerrada".to_string(),
                )),
            };
        }

        log::info!("Caja {caja_id} cerrada con conteo {efectivo_contado}");
        self.obtener(caja_id).await
    }

    /// Asigna el siguiente folio del turno: `prefijo * 100 + contador`.
    ///
    /// El incremento es una actualizacion condicionada sobre el contador
    /// leido (`WHERE contador_folio = C AND estado = 'abierta'`); si otra
    /// terminal gano la carrera se relee y se reintenta. El estado se
    /// re-verifica en la base en cada intento: una caja cerrada es
    /// inmutable, y si se cerro a media venta el folio pasa a modo
    /// degradado. Nunca hay folios perdidos ni duplicados.
    pub async fn siguiente_folio(&self, caja: &caja_entity::Model) -> AppResult<i32> {
        let mut contador = caja.contador_folio;
        let mut prefijo = caja.prefijo_folio;

        for _ in 0..5 {
            let siguiente = contador + 1;
            let resultado = caja_entity::Entity::update_many()
                .col_expr(caja_entity::Column::ContadorFolio, Expr::value(siguiente))
                .filter(caja_entity::Column::Id.eq(caja.id))
                .filter(caja_entity::Column::Estado.eq(EstadoCaja::Abierta))
                .filter(caja_entity::Column::ContadorFolio.eq(contador))
                .exec(self.db.as_ref())
                .await?;

            if resultado.rows_affected == 1 {
                return Ok(prefijo * 100 + siguiente);
            }

            let recargada = caja_entity::Entity::find_by_id(caja.id)
                .one(self.db.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Caja {} no encontrada", caja.id)))?;
            if recargada.estado != EstadoCaja::Abierta {
                // La otra terminal cerro el turno a media venta; el turno
                // congelado no presta mas folios.
                log::warn!(
                    "Caja {} se cerro durante la venta; folio degradado por reloj",
                    caja.id
                );
                return Ok(Self::folio_degradado());
            }
            contador = recargada.contador_folio;
            prefijo = recargada.prefijo_folio;
        }

        Err(AppError::ConflictError(
            "No se pudo asignar folio por contencion; reintente".to_string(),
        ))
    }

    /// Folio de emergencia cuando no hay caja abierta: derivado del reloj.
    /// Modo degradado, no un error; la venta procede sin folio de turno.
    pub fn folio_degradado() -> i32 {
        (Utc::now().timestamp_millis() % 10_000) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn caja_modelo(id: i64, estado: EstadoCaja, prefijo: i32, contador: i32) -> caja_entity::Model {
        caja_entity::Model {
            id,
            sucursal_id: 1,
            estado,
            abierta_en: Utc::now(),
            cerrada_en: None,
            fondo_inicial: dec!(1000),
            efectivo_contado: None,
            efectivo_siguiente_turno: None,
            notas: None,
            prefijo_folio: prefijo,
            contador_folio: contador,
        }
    }

    fn sucursal_modelo() -> sucursal_entity::Model {
        sucursal_entity::Model {
            id: 1,
            nombre: "Centro".to_string(),
            activa: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn abrir_con_caja_abierta_regresa_la_existente() {
        let existente = caja_modelo(7, EstadoCaja::Abierta, 42, 3);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sucursal_modelo()]])
            .append_query_results([vec![existente.clone()]])
            .into_connection();

        let servicio = CajaService::new(Arc::new(db));
        match servicio.abrir_caja(1, dec!(500)).await.unwrap() {
            AperturaCaja::YaAbierta(caja) => assert_eq!(caja.id, existente.id),
            otra => panic!("se esperaba YaAbierta, se obtuvo {otra:?}"),
        }
    }

    #[tokio::test]
    async fn abrir_con_fondo_negativo_falla_sin_tocar_la_base() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let servicio = CajaService::new(Arc::new(db));
        let err = servicio.abrir_caja(1, dec!(-1)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn cerrar_dos_veces_falla_sin_mutar() {
        let cerrada = caja_entity::Model {
            efectivo_contado: Some(dec!(980)),
            estado: EstadoCaja::Cerrada,
            ..caja_modelo(7, EstadoCaja::Cerrada, 42, 9)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![cerrada]])
            .into_connection();

        let servicio = CajaService::new(Arc::new(db));
        let err = servicio
            .cerrar_caja(7, dec!(950), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConflictError(_)));
    }

    #[tokio::test]
    async fn folio_sin_contencion() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let servicio = CajaService::new(Arc::new(db));
        let caja = caja_modelo(7, EstadoCaja::Abierta, 42, 0);
        assert_eq!(servicio.siguiente_folio(&caja).await.unwrap(), 4201);
    }

    #[tokio::test]
    async fn folio_reintenta_tras_perder_la_carrera() {
        // Otra terminal avanzo el contador a 7 entre la lectura y el update.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .append_query_results([vec![caja_modelo(7, EstadoCaja::Abierta, 42, 7)]])
            .into_connection();

        let servicio = CajaService::new(Arc::new(db));
        let caja = caja_modelo(7, EstadoCaja::Abierta, 42, 3);
        assert_eq!(servicio.siguiente_folio(&caja).await.unwrap(), 4208);
    }

    #[tokio::test]
    async fn folio_cae_a_degradado_si_la_caja_se_cierra_en_la_carrera() {
        // La otra terminal cerro el turno entre la lectura y el update; el
        // update condicionado sobre estado='abierta' ya no encuentra
        // renglon y la relectura muestra la caja congelada. No se reintenta
        // ni se toca el contador del turno cerrado.
        let cerrada = caja_entity::Model {
            estado: EstadoCaja::Cerrada,
            cerrada_en: Some(Utc::now()),
            efectivo_contado: Some(dec!(980)),
            ..caja_modelo(7, EstadoCaja::Cerrada, 42, 3)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![cerrada]])
            .into_connection();

        let servicio = CajaService::new(Arc::new(db));
        let caja = caja_modelo(7, EstadoCaja::Abierta, 42, 3);
        let folio = servicio.siguiente_folio(&caja).await.unwrap();
        assert!((0..10_000).contains(&folio));
    }

    #[test]
    fn folios_secuenciales_son_crecientes_y_unicos() {
        let prefijo = 42;
        let folios: Vec<i32> = (1..=50).map(|c| prefijo * 100 + c).collect();
        let mut unicos = folios.clone();
        unicos.dedup();
        assert_eq!(unicos.len(), 50);
        assert!(folios.windows(2).all(|par| par[0] < par[1]));
    }

    #[test]
    fn folio_degradado_cabe_en_cuatro_digitos() {
        for _ in 0..10 {
            let folio = CajaService::folio_degradado();
            assert!((0..10_000).contains(&folio));
        }
    }
}
