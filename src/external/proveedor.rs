use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ProveedorConfig;
use crate::error::{AppError, AppResult};

/// Envoltura estandar de las respuestas del proveedor del punto de venta.
#[derive(Debug, Serialize, Deserialize)]
pub struct RespuestaProveedor<T> {
    pub code: String,
    pub message: String,
    pub data: Option<T>,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginaOrdenes {
    pub records: Vec<OrdenHistorica>,
    pub total: i64,
    pub size: i64,
    pub current: i64,
    pub pages: i64,
}

/// Orden tal como la entrega el proveedor. Se expone sin transformar en
/// `/historial/ordenes`; el front decide que columnas mostrar.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrdenHistorica {
    pub id: i64,
    #[serde(rename = "createDate")]
    pub create_date: i64,
    #[serde(rename = "branchCode")]
    pub branch_code: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "productName")]
    pub product_name: String,
    #[serde(rename = "productNo")]
    pub product_no: Option<String>,
    pub status: i32,
    #[serde(rename = "payType")]
    pub pay_type: Option<i32>,
}

pub struct ProveedorApi {
    client: Client,
    config: ProveedorConfig,
    token: Option<String>,
}

impl ProveedorApi {
    pub fn new(config: ProveedorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            token: None,
        }
    }

    pub async fn login(&mut self) -> AppResult<()> {
        let url = format!("{}/api/auth/login", self.config.base_url);

        let data = serde_json::json!({
            "username": self.config.usuario,
            "password": self.config.password,
        });

        let response = self.client.post(&url).json(&data).send().await?;
        let result: RespuestaProveedor<serde_json::Value> = response.json().await?;

        if !result.success {
            return Err(AppError::ExternalApiError(format!(
                "Login con el proveedor fallo: {}",
                result.message
            )));
        }

        let data = result.data.ok_or_else(|| {
            AppError::ExternalApiError("Respuesta de login del proveedor sin datos".to_string())
        })?;

        self.token = data["currentToken"].as_str().map(|s| s.to_string());
        if self.token.is_none() {
            return Err(AppError::ExternalApiError(
                "Respuesta de login del proveedor sin token".to_string(),
            ));
        }

        log::info!("Sesion con el proveedor del punto de venta iniciada");
        Ok(())
    }

    /// Historial de ordenes del proveedor entre dos fechas (`YYYY-MM-DD`).
    /// Recorre la paginacion completa del lado del servidor.
    pub async fn ordenes_historicas(
        &self,
        fecha_inicio: &str,
        fecha_fin: &str,
    ) -> AppResult<Vec<OrdenHistorica>> {
        let token = self.token()?;

        let url = format!("{}/api/orders/page", self.config.base_url);
        let mut todas = Vec::new();
        let mut pagina = 1;

        loop {
            let mut params = HashMap::new();
            params.insert("startDate", fecha_inicio.to_string());
            params.insert("endDate", fecha_fin.to_string());
            params.insert("current", pagina.to_string());
            params.insert("size", "100".to_string());
            params.insert("status", "1".to_string());

            let response = self
                .client
                .get(&url)
                .query(&params)
                .header("Authorization", token)
                .send()
                .await?;

            let result: RespuestaProveedor<PaginaOrdenes> = response.json().await?;

            if !result.success {
                return Err(AppError::ExternalApiError(format!(
                    "El proveedor rechazo la consulta de ordenes: {}",
                    result.message
                )));
            }

            let page_data = result.data.ok_or_else(|| {
                AppError::ExternalApiError("Pagina de ordenes del proveedor vacia".to_string())
            })?;

            todas.extend(page_data.records);

            if pagina >= page_data.pages {
                break;
            }
            pagina += 1;
        }

        Ok(todas)
    }

    fn token(&self) -> AppResult<&str> {
        self.token.as_deref().ok_or_else(|| {
            AppError::ExternalApiError("Sin sesion con el proveedor del punto de venta".to_string())
        })
    }
}
