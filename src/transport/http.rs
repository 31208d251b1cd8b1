use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use super::adapter::Transport;
use crate::config::BrokerConfig;

/// Management path appended to the configured broker URL.
const MGMT_PATH: &str = "/SEMP";

/// HTTP transport against the broker's legacy management endpoint.
///
/// Every page is one POST of an XML command body. The body of the
/// response is read to completion here, so the walker only ever holds
/// a fully drained buffer and no connection outlives the call.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(cfg: &BrokerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", cfg.url.trim_end_matches('/'), MGMT_PATH),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &str) -> Result<Bytes> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/xml")
            .body(request.to_owned())
            .send()
            .await
            .with_context(|| format!("post to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("broker returned http {} for {}", status, self.endpoint);
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read page body from {}", self.endpoint))?;

        debug!("fetched {} byte page from {}", body.len(), self.endpoint);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker_config(url: &str) -> BrokerConfig {
        BrokerConfig {
            url: url.to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn management_path_is_appended_once() {
        let transport = HttpTransport::new(&broker_config("http://broker:8080")).unwrap();
        assert_eq!(transport.endpoint, "http://broker:8080/SEMP");

        let transport = HttpTransport::new(&broker_config("http://broker:8080/")).unwrap();
        assert_eq!(transport.endpoint, "http://broker:8080/SEMP");
    }
}
