pub mod caja;
pub mod common;
pub mod cuadre;
pub mod movimiento;
pub mod orden;

pub use caja::*;
pub use common::*;
pub use cuadre::*;
pub use movimiento::*;
pub use orden::*;
