use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub proveedor: ProveedorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Proveedor POS externo (historico de ordenes y catalogo, solo lectura).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProveedorConfig {
    pub base_url: String,
    pub usuario: String,
    pub password: String,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Si no hay archivo de configuracion se construye todo desde
        // variables de entorno.
        let config_result = std::fs::read_to_string(&config_path);

        let config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("No se pudo leer {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // Sin archivo, la URL de la base es obligatoria.
                let database_url = get_env("DATABASE_URL")
                    .ok_or("Falta DATABASE_URL y no se encontro config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    proveedor: ProveedorConfig {
                        base_url: get_env("PROVEEDOR_BASE_URL").unwrap_or_default(),
                        usuario: get_env("PROVEEDOR_USUARIO").unwrap_or_default(),
                        password: get_env("PROVEEDOR_PASSWORD").unwrap_or_default(),
                    },
                }
            }
            Err(e) => return Err(format!("No se pudo leer {config_path}: {e}").into()),
        };

        Ok(config)
    }
}
