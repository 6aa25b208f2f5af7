use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{movimiento_entity, CategoriaGasto, TipoMovimiento};
use crate::error::AppError;

/// DTO suelto del endpoint; se convierte a [`Movimiento`] antes de tocar la
/// base. La combinacion invalida (gasto sin categoria) no puede construirse.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegistrarMovimientoRequest {
    pub caja_id: i64,
    pub tipo: TipoMovimiento,
    pub monto: Decimal,
    pub comentario: Option<String>,
    pub categoria: Option<CategoriaGasto>,
}

/// Movimiento de caja ya validado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Movimiento {
    Deposito { monto: Decimal },
    Retiro { monto: Decimal },
    Gasto { categoria: CategoriaGasto, monto: Decimal },
}

impl Movimiento {
    pub fn tipo(&self) -> TipoMovimiento {
        match self {
            Movimiento::Deposito { .. } => TipoMovimiento::Deposito,
            Movimiento::Retiro { .. } => TipoMovimiento::Retiro,
            Movimiento::Gasto { .. } => TipoMovimiento::Gasto,
        }
    }

    pub fn monto(&self) -> Decimal {
        match self {
            Movimiento::Deposito { monto }
            | Movimiento::Retiro { monto }
            | Movimiento::Gasto { monto, .. } => *monto,
        }
    }

    pub fn categoria(&self) -> Option<CategoriaGasto> {
        match self {
            Movimiento::Gasto { categoria, .. } => Some(*categoria),
            _ => None,
        }
    }
}

impl TryFrom<&RegistrarMovimientoRequest> for Movimiento {
    type Error = AppError;

    fn try_from(req: &RegistrarMovimientoRequest) -> Result<Self, Self::Error> {
        if req.monto <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "El monto debe ser mayor a cero".to_string(),
            ));
        }

        match req.tipo {
            TipoMovimiento::Deposito => Ok(Movimiento::Deposito { monto: req.monto }),
            TipoMovimiento::Retiro => Ok(Movimiento::Retiro { monto: req.monto }),
            TipoMovimiento::Gasto => {
                let categoria = req.categoria.ok_or_else(|| {
                    AppError::ValidationError(
                        "Un gasto requiere categoria".to_string(),
                    )
                })?;
                Ok(Movimiento::Gasto {
                    categoria,
                    monto: req.monto,
                })
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovimientoResponse {
    pub id: i64,
    pub caja_id: i64,
    pub tipo: TipoMovimiento,
    pub monto: Decimal,
    pub comentario: Option<String>,
    pub categoria: Option<CategoriaGasto>,
    pub created_at: DateTime<Utc>,
}

impl From<movimiento_entity::Model> for MovimientoResponse {
    fn from(m: movimiento_entity::Model) -> Self {
        Self {
            id: m.id,
            caja_id: m.caja_id,
            tipo: m.tipo,
            monto: m.monto,
            comentario: m.comentario,
            categoria: m.categoria_gasto,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn req(tipo: TipoMovimiento, monto: Decimal, categoria: Option<CategoriaGasto>) -> RegistrarMovimientoRequest {
        RegistrarMovimientoRequest {
            caja_id: 1,
            tipo,
            monto,
            comentario: None,
            categoria,
        }
    }

    #[test]
    fn deposito_valido() {
        let m = Movimiento::try_from(&req(TipoMovimiento::Deposito, dec!(100), None)).unwrap();
        assert_eq!(m, Movimiento::Deposito { monto: dec!(100) });
        assert_eq!(m.tipo(), TipoMovimiento::Deposito);
        assert_eq!(m.categoria(), None);
    }

    #[test]
    fn monto_cero_o_negativo_rechazado() {
        assert!(Movimiento::try_from(&req(TipoMovimiento::Retiro, dec!(0), None)).is_err());
        assert!(Movimiento::try_from(&req(TipoMovimiento::Deposito, dec!(-5), None)).is_err());
    }

    #[test]
    fn gasto_requiere_categoria() {
        let err = Movimiento::try_from(&req(TipoMovimiento::Gasto, dec!(20), None));
        assert!(matches!(err, Err(AppError::ValidationError(_))));

        let ok = Movimiento::try_from(&req(
            TipoMovimiento::Gasto,
            dec!(20),
            Some(CategoriaGasto::Insumos),
        ))
        .unwrap();
        assert_eq!(ok.categoria(), Some(CategoriaGasto::Insumos));
        assert_eq!(ok.monto(), dec!(20));
    }

    #[test]
    fn categoria_en_deposito_se_ignora() {
        let m = Movimiento::try_from(&req(
            TipoMovimiento::Deposito,
            dec!(50),
            Some(CategoriaGasto::Renta),
        ))
        .unwrap();
        assert_eq!(m.categoria(), None);
    }
}
