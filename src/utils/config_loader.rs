use async_trait::async_trait;
use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::{env, fs};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Loads one typed section out of a TOML config file.
#[async_trait]
pub trait RouterConfigLoader {
    type Section;

    async fn load_section_from_file(path: &str) -> Result<Self::Section, LoadConfigError>;
}

pub trait RouterConfigLoaderSync {
    type Section;

    fn load_section_from_file_sync(path: &str) -> Result<Self::Section, LoadConfigError>;
}

pub async fn load_from_file<T: DeserializeOwned>(path: &str) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(toml::from_str(&expand_vars(&raw))?)
}

pub fn load_from_file_sync<T: DeserializeOwned>(path: &str) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&expand_vars(&raw))?)
}

fn expand_vars(raw: &str) -> String {
    // https://stackoverflow.com/questions/62888154/rust-load-environment-variables-into-log4rs-yml-file
    let re = Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}").unwrap();
    re.replace_all(raw, |caps: &Captures| env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())).to_string()
}
