use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;
use tokio::sync::Mutex;

use kiosko_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::ProveedorApi,
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("No se pudo cargar la configuracion");

    let pool = Arc::new(
        create_pool(&config.database)
            .await
            .expect("No se pudo crear el pool de conexiones"),
    );

    run_migrations(&pool)
        .await
        .expect("No se pudieron aplicar las migraciones");

    // El proveedor externo es solo para el historial; si su login falla el
    // punto de venta arranca igual y el handler reintenta la sesion.
    let mut proveedor = ProveedorApi::new(config.proveedor.clone());
    if let Err(e) = proveedor.login().await {
        log::error!("Login con el proveedor externo fallo: {:?}", e);
    }
    let proveedor = Arc::new(Mutex::new(proveedor));

    let caja_service = CajaService::new(pool.clone());
    let movimiento_service = MovimientoService::new(pool.clone());
    let orden_service = OrdenService::new(pool.clone());
    let cuadre_service = CuadreService::new(pool.clone());

    log::info!(
        "Iniciando servidor HTTP en {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(caja_service.clone()))
            .app_data(web::Data::new(movimiento_service.clone()))
            .app_data(web::Data::new(orden_service.clone()))
            .app_data(web::Data::new(cuadre_service.clone()))
            .app_data(web::Data::new(proveedor.clone()))
            .configure(swagger_config)
            .configure(handlers::caja_config)
            .configure(handlers::ordenes_config)
            .configure(handlers::historial_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
