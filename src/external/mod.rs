pub mod proveedor;

pub use proveedor::*;
