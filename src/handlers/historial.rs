use std::sync::Arc;

use actix_web::{web, HttpResponse, ResponseError, Result};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::external::ProveedorApi;

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistorialQuery {
    /// Fecha inicial, `YYYY-MM-DD`.
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

#[utoipa::path(
    get,
    path = "/historial/ordenes",
    tag = "historial",
    params(
        ("fecha_inicio" = String, Query, description = "Desde, YYYY-MM-DD"),
        ("fecha_fin" = String, Query, description = "Hasta, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Ordenes historicas del proveedor, sin transformar"),
        (status = 502, description = "El proveedor no respondio o rechazo la sesion")
    )
)]
pub async fn ordenes_historicas(
    proveedor: web::Data<Arc<Mutex<ProveedorApi>>>,
    query: web::Query<HistorialQuery>,
) -> Result<HttpResponse> {
    let mut api = proveedor.lock().await;

    // Si el token expiro o el login de arranque fallo, un reintento con
    // sesion fresca antes de darse por vencido.
    let ordenes = match api
        .ordenes_historicas(&query.fecha_inicio, &query.fecha_fin)
        .await
    {
        Ok(ordenes) => ordenes,
        Err(_) => {
            if let Err(e) = api.login().await {
                return Ok(e.error_response());
            }
            match api
                .ordenes_historicas(&query.fecha_inicio, &query.fecha_fin)
                .await
            {
                Ok(ordenes) => ordenes,
                Err(e) => return Ok(e.error_response()),
            }
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": ordenes
    })))
}

pub fn historial_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/historial").route("/ordenes", web::get().to(ordenes_historicas)));
}
