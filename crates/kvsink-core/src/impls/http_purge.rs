//! Fire-and-forget cache purge against the web app. Purge failures are
//! logged and swallowed; the write already verified.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::CorrelationId;
use crate::ports::CachePurger;

use super::CORRELATION_ID_HEADER;
use super::signing;

const PURGE_PATH: &str = "/api/cache/purge";

pub struct HttpCachePurger {
    client: reqwest::Client,
    base_url: String,
    secret: String,
}

impl HttpCachePurger {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.web_app_url.clone(),
            secret: settings.secret.clone(),
        })
    }
}

#[async_trait]
impl CachePurger for HttpCachePurger {
    async fn purge(&self, task_id: &str, cid: &CorrelationId) {
        let ts = signing::unix_timestamp();
        let token = signing::sign(PURGE_PATH, &ts, &self.secret);
        let url = format!("{}{PURGE_PATH}?token={token}&ts={ts}", self.base_url);

        let result = self
            .client
            .post(url)
            .header(CORRELATION_ID_HEADER, cid.as_str())
            .json(&json!({ "taskId": task_id }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(cid = %cid, task = task_id, "cache purge accepted");
            }
            Ok(response) => {
                warn!(
                    cid = %cid,
                    task = task_id,
                    "cache purge rejected: {}",
                    response.status()
                );
            }
            Err(e) => {
                warn!(cid = %cid, task = task_id, "cache purge request failed: {e}");
            }
        }
    }
}
