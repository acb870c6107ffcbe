use anyhow::Context;
use secrecy::Secret;

/// Process configuration, read from the environment once at startup and
/// passed around by reference afterwards.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub database_url: String,
    pub api_key: Secret<String>,
}

impl Configuration {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL env variable should be set")?;
        let api_key = std::env::var("API_KEY").context("API_KEY env variable should be set")?;

        Ok(Self {
            database_url,
            api_key: Secret::new(api_key),
        })
    }
}
