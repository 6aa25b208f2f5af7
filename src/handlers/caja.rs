use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::{AperturaCaja, CajaService, CuadreService, MovimientoService};

#[utoipa::path(
    post,
    path = "/caja",
    tag = "caja",
    request_body = AbrirCajaRequest,
    responses(
        (status = 200, description = "Caja abierta"),
        (status = 409, description = "La sucursal ya tiene una caja abierta"),
        (status = 400, description = "Fondo inicial invalido o sucursal inactiva")
    )
)]
pub async fn abrir_caja(
    caja_service: web::Data<CajaService>,
    body: web::Json<AbrirCajaRequest>,
) -> Result<HttpResponse> {
    match caja_service
        .abrir_caja(body.sucursal_id, body.fondo_inicial)
        .await
    {
        Ok(AperturaCaja::Creada(caja)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CajaResponse::from(caja)
        }))),
        // La caja existente viaja en el cuerpo para que la terminal se
        // adopte a ella en lugar de quedarse bloqueada.
        Ok(AperturaCaja::YaAbierta(caja)) => Ok(HttpResponse::Conflict().json(json!({
            "success": false,
            "error": {
                "code": "CONFLICT",
                "message": "La sucursal ya tiene una caja abierta"
            },
            "data": CajaResponse::from(caja)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/caja",
    tag = "caja",
    params(
        ("sucursal_id" = i64, Query, description = "Sucursal a consultar")
    ),
    responses(
        (status = 200, description = "Caja abierta de la sucursal, o nulo con el efectivo que dejo el turno anterior")
    )
)]
pub async fn consultar_caja(
    caja_service: web::Data<CajaService>,
    query: web::Query<ConsultaCajaQuery>,
) -> Result<HttpResponse> {
    let respuesta = match caja_service.caja_abierta(query.sucursal_id).await {
        Ok(Some(caja)) => ConsultaCajaResponse {
            caja: Some(CajaResponse::from(caja)),
            efectivo_siguiente_turno: None,
        },
        Ok(None) => match caja_service.ultima_cerrada(query.sucursal_id).await {
            Ok(anterior) => ConsultaCajaResponse {
                caja: None,
                efectivo_siguiente_turno: anterior.and_then(|c| c.efectivo_siguiente_turno),
            },
            Err(e) => return Ok(e.error_response()),
        },
        Err(e) => return Ok(e.error_response()),
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": respuesta
    })))
}

#[utoipa::path(
    post,
    path = "/caja/cerrar",
    tag = "caja",
    request_body = CerrarCajaRequest,
    responses(
        (status = 200, description = "Caja cerrada con su conteo"),
        (status = 404, description = "Caja inexistente"),
        (status = 409, description = "La caja ya estaba cerrada")
    )
)]
pub async fn cerrar_caja(
    caja_service: web::Data<CajaService>,
    body: web::Json<CerrarCajaRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    match caja_service
        .cerrar_caja(
            body.caja_id,
            body.efectivo_contado,
            body.notas,
            body.efectivo_siguiente_turno,
        )
        .await
    {
        Ok(caja) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CajaResponse::from(caja)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/caja/cuadre",
    tag = "caja",
    params(
        ("caja_id" = i64, Query, description = "Caja a cuadrar, abierta o cerrada")
    ),
    responses(
        (status = 200, description = "Reporte de cuadre", body = CuadreReport),
        (status = 404, description = "Caja inexistente")
    )
)]
pub async fn cuadre(
    cuadre_service: web::Data<CuadreService>,
    query: web::Query<CuadreQuery>,
) -> Result<HttpResponse> {
    match cuadre_service.cuadre(query.caja_id).await {
        Ok(reporte) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reporte
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/caja/movimientos",
    tag = "caja",
    params(
        ("caja_id" = i64, Query, description = "Caja cuyos movimientos se listan")
    ),
    responses(
        (status = 200, description = "Movimientos en orden cronologico")
    )
)]
pub async fn listar_movimientos(
    movimiento_service: web::Data<MovimientoService>,
    query: web::Query<MovimientosQuery>,
) -> Result<HttpResponse> {
    match movimiento_service.listar(query.caja_id).await {
        Ok(movimientos) => {
            let data: Vec<MovimientoResponse> =
                movimientos.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": data
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/caja/movimientos",
    tag = "caja",
    request_body = RegistrarMovimientoRequest,
    responses(
        (status = 200, description = "Movimiento registrado"),
        (status = 400, description = "Monto invalido o gasto sin categoria"),
        (status = 409, description = "La caja esta cerrada")
    )
)]
pub async fn registrar_movimiento(
    movimiento_service: web::Data<MovimientoService>,
    body: web::Json<RegistrarMovimientoRequest>,
) -> Result<HttpResponse> {
    let movimiento = match Movimiento::try_from(&*body) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };

    let body = body.into_inner();
    match movimiento_service
        .registrar(body.caja_id, movimiento, body.comentario)
        .await
    {
        Ok(registro) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MovimientoResponse::from(registro)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn caja_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/caja")
            .route("", web::post().to(abrir_caja))
            .route("", web::get().to(consultar_caja))
            .route("/cerrar", web::post().to(cerrar_caja))
            .route("/cuadre", web::get().to(cuadre))
            .route("/movimientos", web::get().to(listar_movimientos))
            .route("/movimientos", web::post().to(registrar_movimiento)),
    );
}
