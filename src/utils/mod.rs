pub mod totales;

pub use totales::{calcular_totales, redondear_centavos, tasa_iva, Totales};
