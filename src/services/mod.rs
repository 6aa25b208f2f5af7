pub mod caja_service;
pub mod comisiones;
pub mod cuadre_service;
pub mod movimiento_service;
pub mod orden_service;

pub use caja_service::*;
pub use cuadre_service::*;
pub use movimiento_service::*;
pub use orden_service::*;
