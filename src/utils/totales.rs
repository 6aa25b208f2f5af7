use rust_decimal::{Decimal, RoundingStrategy};

/// Tasa de IVA vigente (16%).
pub fn tasa_iva() -> Decimal {
    Decimal::new(16, 2)
}

/// Redondeo a centavos, mitad hacia afuera (como lo espera contabilidad).
pub fn redondear_centavos(monto: Decimal) -> Decimal {
    monto.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totales {
    pub impuesto: Decimal,
    pub total: Decimal,
}

/// Calcula impuesto y total de una orden.
///
/// Regla de negocio heredada y deliberada: el descuento de empleado NO
/// reduce la base gravable (el impuesto se calcula sobre el subtotal antes
/// del descuento); un descuento manual o por canje si la reduce. No
/// invertir las ramas: los tests de abajo fijan ambas.
pub fn calcular_totales(
    subtotal: Decimal,
    descuento: Decimal,
    descuento_de_empleado: bool,
) -> Totales {
    let base = if descuento_de_empleado {
        subtotal
    } else {
        subtotal - descuento
    };
    let impuesto = redondear_centavos(base * tasa_iva());
    let total = redondear_centavos(subtotal - descuento + impuesto);
    Totales { impuesto, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn descuento_de_empleado_grava_subtotal_completo() {
        let t = calcular_totales(dec!(100), dec!(10), true);
        assert_eq!(t.impuesto, dec!(16.00));
        assert_eq!(t.total, dec!(106.00));
    }

    #[test]
    fn descuento_manual_grava_base_descontada() {
        let t = calcular_totales(dec!(100), dec!(10), false);
        assert_eq!(t.impuesto, dec!(14.40));
        assert_eq!(t.total, dec!(104.40));
    }

    #[test]
    fn sin_descuento_ambas_ramas_coinciden() {
        let a = calcular_totales(dec!(85.50), dec!(0), true);
        let b = calcular_totales(dec!(85.50), dec!(0), false);
        assert_eq!(a, b);
        assert_eq!(a.impuesto, dec!(13.68));
        assert_eq!(a.total, dec!(99.18));
    }

    #[test]
    fn redondeo_a_centavos_mitad_hacia_afuera() {
        assert_eq!(redondear_centavos(dec!(1.005)), dec!(1.01));
        assert_eq!(redondear_centavos(dec!(1.004)), dec!(1.00));
        assert_eq!(redondear_centavos(dec!(-1.005)), dec!(-1.01));
    }
}
