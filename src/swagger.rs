use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    CategoriaGasto, EstadoCaja, EstadoOrden, EstadoPreparacion, MetodoPago, Plataforma,
    TipoMovimiento,
};
use crate::external::OrdenHistorica;
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::caja::abrir_caja,
        handlers::caja::consultar_caja,
        handlers::caja::cerrar_caja,
        handlers::caja::cuadre,
        handlers::caja::listar_movimientos,
        handlers::caja::registrar_movimiento,
        handlers::ordenes::crear_orden,
        handlers::ordenes::listar_ordenes,
        handlers::ordenes::reembolsar,
        handlers::ordenes::actualizar_preparacion,
        handlers::historial::ordenes_historicas,
    ),
    components(
        schemas(
            AbrirCajaRequest,
            CerrarCajaRequest,
            CajaResponse,
            ConsultaCajaResponse,
            RegistrarMovimientoRequest,
            MovimientoResponse,
            CrearOrdenRequest,
            ItemOrdenInput,
            PagoInput,
            Modificador,
            ReembolsoRequest,
            PreparacionRequest,
            OrdenResponse,
            ItemOrdenResponse,
            PagoResponse,
            CuadreReport,
            CuadrePlataforma,
            GastoPorCategoria,
            OrdenHistorica,
            handlers::historial::HistorialQuery,
            ApiError,
            EstadoCaja,
            EstadoOrden,
            EstadoPreparacion,
            MetodoPago,
            TipoMovimiento,
            CategoriaGasto,
            Plataforma,
        )
    ),
    tags(
        (name = "caja", description = "Apertura, cierre, movimientos y cuadre de caja"),
        (name = "ordenes", description = "Ordenes del punto de venta"),
        (name = "historial", description = "Historico del proveedor externo"),
    ),
    info(
        title = "Kiosko Backend API",
        version = "1.0.0",
        description = "Backend de punto de venta y caja para la cadena de kioscos",
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
