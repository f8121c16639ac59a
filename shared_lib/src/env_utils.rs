use std::env;

use tracing::error;

use crate::structs::DatabaseConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOCAL_DB_PATH: &str = "local.db";

pub fn get_host_uri() -> String {
    match env::var("HOST") {
        Ok(host) => format!("https://{host}"),
        _ => format!("http://localhost:{}", get_port()),
    }
}

pub fn get_port() -> u16 {
    parse_port(env::var("PORT").ok())
}

fn parse_port(port: Option<String>) -> u16 {
    let port = match port {
        Some(port) => port,
        _ => return DEFAULT_PORT,
    };

    match port.trim().parse::<u16>() {
        Ok(port) => port,
        _ => {
            error!("Failed to parse PORT env var, using default");
            DEFAULT_PORT
        }
    }
}

/// Shared secret used to sign incoming Shopify webhooks.
/// An unset or blank value is treated as missing.
pub fn get_webhook_secret() -> Option<String> {
    non_empty(env::var("SHOPIFY_WEBHOOK_SECRET").ok())
}

pub fn get_database_config() -> DatabaseConfig {
    match non_empty(env::var("LIBSQL_CLIENT_URL").ok()) {
        Some(url) => DatabaseConfig::Remote {
            url,
            auth_token: env::var("LIBSQL_CLIENT_TOKEN").unwrap_or_default(),
        },
        None => DatabaseConfig::Local {
            path: non_empty(env::var("LIBSQL_LOCAL_DB_PATH").ok())
                .unwrap_or(DEFAULT_LOCAL_DB_PATH.to_string()),
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
