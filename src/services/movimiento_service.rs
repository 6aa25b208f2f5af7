use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::entities::{caja_entity, movimiento_entity, EstadoCaja};
use crate::error::{AppError, AppResult};
use crate::models::Movimiento;

#[derive(Clone)]
pub struct MovimientoService {
    db: Arc<DatabaseConnection>,
}

impl MovimientoService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Registra un movimiento contra una caja abierta. El estado de la caja
    /// se re-valida dentro de la transaccion, con lock compartido sobre el
    /// renglon: una terminal con una vista vieja de "abierta" no puede
    /// colar movimientos en una caja que otra terminal ya cerro.
    pub async fn registrar(
        &self,
        caja_id: i64,
        movimiento: Movimiento,
        comentario: Option<String>,
    ) -> AppResult<movimiento_entity::Model> {
        let txn = self.db.begin().await?;

        let caja = caja_entity::Entity::find_by_id(caja_id)
            .lock_shared()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Caja {caja_id} no encontrada")))?;

        if caja.estado != EstadoCaja::Abierta {
            return Err(AppError::ConflictError(
                "La caja esta cerrada; no se pueden registrar movimientos".to_string(),
            ));
        }

        let registro = movimiento_entity::ActiveModel {
            caja_id: Set(caja_id),
            tipo: Set(movimiento.tipo()),
            monto: Set(movimiento.monto()),
            comentario: Set(comentario),
            categoria_gasto: Set(movimiento.categoria()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "Movimiento {:?} de {} registrado en caja {}",
            registro.tipo,
            registro.monto,
            caja_id
        );
        Ok(registro)
    }

    pub async fn listar(&self, caja_id: i64) -> AppResult<Vec<movimiento_entity::Model>> {
        let movimientos = movimiento_entity::Entity::find()
            .filter(movimiento_entity::Column::CajaId.eq(caja_id))
            .order_by_asc(movimiento_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(movimientos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn rechaza_movimiento_en_caja_cerrada() {
        let cerrada = caja_entity::Model {
            id: 3,
            sucursal_id: 1,
            estado: EstadoCaja::Cerrada,
            abierta_en: Utc::now(),
            cerrada_en: Some(Utc::now()),
            fondo_inicial: dec!(1000),
            efectivo_contado: Some(dec!(1000)),
            efectivo_siguiente_turno: None,
            notas: None,
            prefijo_folio: 10,
            contador_folio: 4,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cerrada]])
            .into_connection();

        let servicio = MovimientoService::new(Arc::new(db));
        let err = servicio
            .registrar(3, Movimiento::Deposito { monto: dec!(100) }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConflictError(_)));
    }

    #[tokio::test]
    async fn caja_inexistente_es_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<caja_entity::Model>::new()])
            .into_connection();

        let servicio = MovimientoService::new(Arc::new(db));
        let err = servicio
            .registrar(99, Movimiento::Retiro { monto: dec!(50) }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
