use reqwest::{Method, RequestBuilder, StatusCode};
use url::Url;

use crate::db::Parameters;
use crate::error::{AppError, AppResult, TravisFailure};
use crate::travis::{PARAMETER_TOKEN, PARAMETER_URL};

const USER_AGENT: &str = "Ligoj/1.0.0";
const ACCEPT: &str = "application/vnd.travis-ci.2+json";

/// Client for the Travis v2 API of one node.
/// See https://docs.travis-ci.com/api/
pub struct TravisClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl TravisClient {
    /// Build a client from node or subscription parameters.
    pub fn new(parameters: &Parameters) -> AppResult<Self> {
        let base = parameters.get(PARAMETER_URL).ok_or_else(|| {
            AppError::InvalidInput(format!("Missing parameter {}", PARAMETER_URL))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(base)?,
            token: parameters.get(PARAMETER_TOKEN).cloned().unwrap_or_default(),
        })
    }

    /// API URL made of the base URL followed by `segments`, each one
    /// percent-encoded.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> AppResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Not a valid Travis API URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("token {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
    }

    /// Send the request and return the body of a successful response.
    ///
    /// A missing resource or any unexpected status gives `None`. Refused
    /// credentials and an unreachable server are reported as such.
    async fn send(&self, request: RequestBuilder) -> AppResult<Option<String>> {
        let response = request.send().await.map_err(|e| {
            log::warn!("Travis server unreachable: {}", e);
            AppError::Travis(TravisFailure::Connection)
        })?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(Some(response.text().await?)),
            StatusCode::UNAUTHORIZED => Err(AppError::Travis(TravisFailure::Login)),
            StatusCode::FORBIDDEN => Err(AppError::Travis(TravisFailure::Rights)),
            StatusCode::NOT_FOUND => Ok(None),
            s => {
                log::warn!("Travis answered {} for {}", s, response.url());
                Ok(None)
            }
        }
    }

    pub async fn get(&self, url: Url) -> AppResult<Option<String>> {
        log::debug!("GET {}", url);
        self.send(self.request(Method::GET, url)).await
    }

    /// POST without a body, true when the server accepted it.
    pub async fn post(&self, url: Url) -> AppResult<bool> {
        log::debug!("POST {}", url);
        Ok(self.send(self.request(Method::POST, url)).await?.is_some())
    }
}
