use std::env;

use crate::error::{AppError, Result};

const DEFAULT_DATABASE: &str = "OpenBills";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq)]
pub enum StoreKind {
    Mongo { uri: String, database: String },
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store: StoreKind,
    pub bind_address: String,
    pub port: u16,
    pub auth_secret: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Config> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let store = match lookup("BILLS_STORE").as_deref() {
            Some("memory") => StoreKind::Memory,
            None | Some("mongo") => StoreKind::Mongo {
                uri: lookup("MONGODB_URI").ok_or_else(|| {
                    AppError::Config("You need to add the MONGODB_URI to the env".into())
                })?,
                database: lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.into()),
            },
            Some(other) => {
                return Err(AppError::Config(format!(
                    "BILLS_STORE must be `mongo` or `memory`, got `{other}`"
                )))
            }
        };
        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a port number: {port}")))?,
            None => DEFAULT_PORT,
        };
        let auth_secret = lookup("AUTH_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Config("You need to add the AUTH_SECRET to the env".into()))?;
        Ok(Config {
            store,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into()),
            port,
            auth_secret,
        })
    }
}
