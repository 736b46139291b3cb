use crate::{Error, Result, config::HttpConfig};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Extra request headers as `(name, value)` pairs
pub type Headers<'a> = &'a [(&'a str, &'a str)];

/// HTTP client wrapper shared by all adapters and extractors
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a client from settings
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a page as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.get_text_with(url, &[]).await
    }

    /// GET a page as text with extra headers
    pub async fn get_text_with(&self, url: &str, headers: Headers<'_>) -> Result<String> {
        let response = Self::send(with_headers(self.client.get(url), headers)).await?;
        Ok(response.text().await?)
    }

    /// GET and parse a JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with(url, &[]).await
    }

    /// GET and parse a JSON response with extra headers
    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: Headers<'_>,
    ) -> Result<T> {
        let response = Self::send(with_headers(self.client.get(url), headers)).await?;
        Self::parse_json(response).await
    }

    /// POST a form-encoded body and parse the JSON response
    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: Headers<'_>,
    ) -> Result<T> {
        let request = with_headers(self.client.post(url), headers).form(form);
        let response = Self::send(request).await?;
        Self::parse_json(response).await
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        headers: Headers<'_>,
    ) -> Result<T> {
        let request = with_headers(self.client.post(url), headers)
            .header("Accept", "application/json")
            .json(body);
        let response = Self::send(request).await?;
        Self::parse_json(response).await
    }

    /// Follow redirects from `url` and return the final URL
    pub async fn resolve_redirect(&self, url: &str, referer: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }

        let response = Self::send(request).await?;
        let target = response.url().to_string();
        debug!("Redirect resolved: {} -> {}", url, target);

        Ok(target)
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();

            return Err(Error::Api {
                status: status_code,
                message,
            });
        }

        Ok(response)
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Parse(format!("JSON parse error: {e}")))
    }
}

fn with_headers(mut request: RequestBuilder, headers: Headers<'_>) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}

/// Format an `Authorization` header value
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
