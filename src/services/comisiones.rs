use rust_decimal::Decimal;

use crate::entities::Plataforma;

/// Comision fija del adquirente de tarjeta (3.6% sobre lo cobrado).
pub fn tasa_comision_tarjeta() -> Decimal {
    Decimal::new(36, 3)
}

/// Tasas pactadas con cada plataforma de entrega. La comision se calcula
/// sobre el monto que realmente transito por cada metodo, no sobre el
/// total_plataforma.
pub fn tasa_plataforma_app(plataforma: Plataforma) -> Decimal {
    match plataforma {
        Plataforma::UberEats => Decimal::new(30, 2),
        Plataforma::Rappi => Decimal::new(28, 2),
        Plataforma::DidiFood => Decimal::new(25, 2),
    }
}

pub fn tasa_plataforma_efectivo(plataforma: Plataforma) -> Decimal {
    match plataforma {
        // Uber liquida el efectivo completo al repartidor, sin comision.
        Plataforma::UberEats => Decimal::ZERO,
        Plataforma::Rappi => Decimal::new(14, 2),
        Plataforma::DidiFood => Decimal::new(10, 2),
    }
}
