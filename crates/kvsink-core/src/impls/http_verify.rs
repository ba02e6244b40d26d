//! HTTP-backed read-back verifier: signed, time-limited GETs against
//! the kv-service read endpoint.
//!
//! Transport failures (timeouts, refused connections, bad bodies) fold
//! into `false`; the handler treats an unverifiable write exactly like
//! an unconfirmed one and the saga takes over.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::{CorrelationId, TaskId, TaskRecord};
use crate::ports::WriteVerifier;

use super::CORRELATION_ID_HEADER;
use super::signing;

pub struct HttpWriteVerifier {
    client: reqwest::Client,
    base_url: String,
    secret: String,
}

impl HttpWriteVerifier {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.kv_service_url.clone(),
            secret: settings.secret.clone(),
        })
    }

    /// GET `/tasks/{id}` with a fresh token. Returns the HTTP status
    /// (0 when the request itself failed) and the body when it was 200.
    async fn fetch_task(&self, id: &TaskId, cid: &CorrelationId) -> (u16, Option<TaskRecord>) {
        let pathname = format!("/tasks/{id}");
        let ts = signing::unix_timestamp();
        let token = signing::sign(&pathname, &ts, &self.secret);
        let url = format!("{}{pathname}?token={token}&ts={ts}", self.base_url);

        let response = match self
            .client
            .get(url)
            .header(CORRELATION_ID_HEADER, cid.as_str())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(cid = %cid, task = %id, "KV verify request failed: {e}");
                return (0, None);
            }
        };

        let status = response.status().as_u16();
        info!(cid = %cid, "KV verify GET {pathname} -> {status}");

        let body = if status == 200 {
            response.json::<TaskRecord>().await.ok()
        } else {
            None
        };
        (status, body)
    }
}

#[async_trait]
impl WriteVerifier for HttpWriteVerifier {
    async fn confirm_exists(&self, id: &TaskId, cid: &CorrelationId) -> bool {
        let (status, _) = self.fetch_task(id, cid).await;
        status == 200
    }

    async fn confirm_fields(&self, id: &TaskId, expected: &TaskRecord, cid: &CorrelationId) -> bool {
        let (_, body) = self.fetch_task(id, cid).await;
        let Some(found) = body else {
            return false;
        };

        let mut mismatches = Vec::new();
        if found.title != expected.title {
            mismatches.push(format!("title: {:?} != {:?}", found.title, expected.title));
        }
        if found.status != expected.status {
            mismatches.push(format!("status: {} != {}", found.status, expected.status));
        }
        if !mismatches.is_empty() {
            warn!(cid = %cid, task = %id, "KV verify mismatch: {}", mismatches.join(", "));
            return false;
        }
        true
    }

    async fn confirm_absent(&self, id: &TaskId, cid: &CorrelationId) -> bool {
        let (status, _) = self.fetch_task(id, cid).await;
        status == 404
    }
}
