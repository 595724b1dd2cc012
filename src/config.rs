use crate::error::{AppError, AppResult};
use crate::nls::Locale;
use crate::view::StatusStyles;

/// A Travis node to register at start, so a fresh database is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSeed {
    pub id: String,
    pub url_api: String,
    pub url_site: String,
    pub api_token: String,
    pub user: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub database_path: String,
    pub default_locale: Locale,
    pub styles: StatusStyles,
    pub seed_node: Option<NodeSeed>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("PORT is not a valid port: {}", e)))?,
            None => 8080,
        };

        let default_locale = match lookup("DEFAULT_LOCALE") {
            Some(tag) => Locale::parse(&tag)
                .ok_or_else(|| AppError::Config(format!("Unsupported DEFAULT_LOCALE: {}", tag)))?,
            None => Locale::default(),
        };

        let styles = match lookup("ICON_SET") {
            Some(name) => StatusStyles::from_icon_set(&name)
                .ok_or_else(|| AppError::Config(format!("Unknown ICON_SET: {}", name)))?,
            None => StatusStyles::default(),
        };

        // The seed node is optional, but a partial definition is a mistake
        let seed_node = match lookup("TRAVIS_URL_API") {
            Some(url_api) => Some(NodeSeed {
                id: lookup("TRAVIS_NODE")
                    .unwrap_or_else(|| "service:build:travis:default".to_string()),
                url_site: lookup("TRAVIS_URL_SITE")
                    .unwrap_or_else(|| "https://travis-ci.org/".to_string()),
                api_token: lookup("TRAVIS_API_TOKEN").ok_or_else(|| {
                    AppError::Config(
                        "TRAVIS_API_TOKEN must be set when TRAVIS_URL_API is".to_string(),
                    )
                })?,
                user: lookup("TRAVIS_USER"),
                url_api,
            }),
            None => None,
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "travis.db".to_string()),
            default_locale,
            styles,
            seed_node,
        })
    }
}
