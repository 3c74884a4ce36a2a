use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load the common settings.
    ///
    /// Precedence: `APP__PORT`, then the hosting platform's `PORT`, then 8080.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let platform_port = std::env::var("PORT").unwrap_or_else(|_| default_port().to_string());

        let config = Cfg::builder()
            .set_default("port", platform_port)?
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
