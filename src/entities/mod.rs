pub mod cajas;
pub mod enums;
pub mod movimientos_caja;
pub mod orden_items;
pub mod ordenes;
pub mod pagos;
pub mod sucursales;

pub use cajas as caja_entity;
pub use movimientos_caja as movimiento_entity;
pub use orden_items as orden_item_entity;
pub use ordenes as orden_entity;
pub use pagos as pago_entity;
pub use sucursales as sucursal_entity;

pub use enums::{
    CategoriaGasto, EstadoCaja, EstadoOrden, EstadoPreparacion, MetodoPago, Plataforma,
    TipoMovimiento,
};
