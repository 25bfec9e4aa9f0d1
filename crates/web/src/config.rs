use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub knowledge_base_url: String,
    pub enrichment_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            knowledge_base_url: std::env::var("KNOWLEDGE_BASE_URL")
                .context("Cannot load KNOWLEDGE_BASE_URL env variable")?,
            enrichment_url: std::env::var("ENRICHMENT_URL")
                .context("Cannot load ENRICHMENT_URL env variable")?,
        })
    }
}
