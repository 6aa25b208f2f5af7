use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::OrdenService;

#[utoipa::path(
    post,
    path = "/ordenes",
    tag = "ordenes",
    request_body = CrearOrdenRequest,
    responses(
        (status = 200, description = "Orden creada con folio asignado", body = OrdenResponse),
        (status = 400, description = "Orden invalida o totales inconsistentes")
    )
)]
pub async fn crear_orden(
    orden_service: web::Data<OrdenService>,
    body: web::Json<CrearOrdenRequest>,
) -> Result<HttpResponse> {
    match orden_service.crear_orden(body.into_inner()).await {
        Ok(detalle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": OrdenResponse::from(detalle)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/ordenes/reembolso",
    tag = "ordenes",
    request_body = ReembolsoRequest,
    responses(
        (status = 200, description = "Orden cancelada; el cuadre la trata como reembolso"),
        (status = 404, description = "Orden inexistente"),
        (status = 409, description = "La orden ya estaba cancelada")
    )
)]
pub async fn reembolsar(
    orden_service: web::Data<OrdenService>,
    body: web::Json<ReembolsoRequest>,
) -> Result<HttpResponse> {
    match orden_service.reembolsar(body.orden_id).await {
        Ok(detalle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": OrdenResponse::from(detalle)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/ordenes",
    tag = "ordenes",
    params(
        ("sucursal_id" = Option<i64>, Query, description = "Filtrar por sucursal"),
        ("fecha_inicio" = Option<String>, Query, description = "Desde, RFC 3339"),
        ("fecha_fin" = Option<String>, Query, description = "Hasta, RFC 3339"),
        ("limite" = Option<u64>, Query, description = "Maximo de ordenes (tope 500)")
    ),
    responses(
        (status = 200, description = "Ordenes con items y pagos, mas reciente primero")
    )
)]
pub async fn listar_ordenes(
    orden_service: web::Data<OrdenService>,
    query: web::Query<OrdenesQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    match orden_service
        .listar(
            query.sucursal_id,
            query.fecha_inicio,
            query.fecha_fin,
            query.limite,
        )
        .await
    {
        Ok(ordenes) => {
            let data: Vec<OrdenResponse> = ordenes.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": data
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/ordenes/{id}/preparacion",
    tag = "ordenes",
    params(
        ("id" = i64, Path, description = "Orden a actualizar")
    ),
    request_body = PreparacionRequest,
    responses(
        (status = 200, description = "Estado de preparacion actualizado"),
        (status = 404, description = "Orden inexistente")
    )
)]
pub async fn actualizar_preparacion(
    orden_service: web::Data<OrdenService>,
    path: web::Path<i64>,
    body: web::Json<PreparacionRequest>,
) -> Result<HttpResponse> {
    match orden_service
        .actualizar_preparacion(path.into_inner(), body.preparacion)
        .await
    {
        Ok(orden) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "id": orden.id,
                "preparacion": orden.preparacion
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ordenes_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ordenes")
            .route("", web::post().to(crear_orden))
            .route("", web::get().to(listar_ordenes))
            .route("/reembolso", web::post().to(reembolsar))
            .route("/{id}/preparacion", web::put().to(actualizar_preparacion)),
    );
}
