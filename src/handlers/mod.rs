pub mod caja;
pub mod historial;
pub mod ordenes;

pub use caja::caja_config;
pub use historial::historial_config;
pub use ordenes::ordenes_config;
