//! reqwest implementation of [`ResourceApi`]

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Envelope, ResourceApi, StoredFile, UploadRequest};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::model::{
    null_as_default, AutoResponse, Command, Converter, ForbiddenWord, ForbiddenWordPayload,
    Group, JoinedGroup, Payload, Record, ResourceKind, UsageSnapshot,
};

/// Longest slice of an error body quoted back to the user
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the bot dashboard API
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    filepath: String,
}

#[derive(Debug, Deserialize)]
struct JoinedGroupsEnvelope {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default, deserialize_with = "null_as_default")]
    groups: Vec<JoinedGroup>,
}

#[derive(Debug, Deserialize)]
struct ConverterList {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default, deserialize_with = "null_as_default")]
    converters: Vec<Converter>,
}

impl HttpApi {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON array; `null` decodes as an empty list
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let resp = self.client.get(&url).query(query).send().await?;
        let body = read_success_body(resp).await?;
        let items: Option<Vec<T>> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(items.unwrap_or_default())
    }

    /// Send a mutating request and interpret its `{status}` envelope
    async fn send_envelope(&self, req: RequestBuilder) -> Result<(), ApiError> {
        let envelope: Envelope = self.send_for_envelope(req).await?;
        envelope.into_result()
    }

    async fn send_for_envelope<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::Transport(format!(
                "{} - {}",
                status,
                excerpt(&body)
            ))),
            Err(e) => Err(ApiError::Decode(e.to_string())),
        }
    }

    fn write_request(&self, create: bool, payload: &Payload) -> RequestBuilder {
        let url = self.url(payload.kind().path());
        if create {
            debug!("POST {}", url);
            self.client.post(&url).json(payload)
        } else {
            debug!("PUT {}", url);
            self.client.put(&url).json(payload)
        }
    }
}

/// Body of a 2xx response, or a transport error carrying status and body
async fn read_success_body(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        warn!("API request failed: {} - {}", status, excerpt(&body));
        return Err(ApiError::Transport(format!("{} - {}", status, excerpt(&body))));
    }
    Ok(body)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl ResourceApi for HttpApi {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Record>, ApiError> {
        let path = kind.path();
        let records = match kind {
            ResourceKind::Group => self
                .get_list::<Group>(path, &[])
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            ResourceKind::Command => self
                .get_list::<Command>(path, &[])
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            ResourceKind::AutoResponse => self
                .get_list::<AutoResponse>(path, &[])
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            // wrapped in an envelope, unlike the bare arrays above
            ResourceKind::Converter => {
                debug!("GET {}", self.url(path));
                let reply: ConverterList = self
                    .send_for_envelope(self.client.get(self.url(path)))
                    .await?;
                reply.envelope.into_result()?;
                reply.converters.into_iter().map(Record::from).collect()
            }
        };
        Ok(records)
    }

    async fn create(&self, payload: &Payload) -> Result<(), ApiError> {
        self.send_envelope(self.write_request(true, payload)).await
    }

    async fn update(&self, payload: &Payload) -> Result<(), ApiError> {
        self.send_envelope(self.write_request(false, payload)).await
    }

    async fn delete(&self, kind: ResourceKind, key: &str) -> Result<(), ApiError> {
        let url = self.url(kind.path());
        debug!("DELETE {}?{}={}", url, kind.key_param(), key);

        let req = self.client.delete(&url).query(&[(kind.key_param(), key)]);
        self.send_envelope(req).await
    }

    async fn stats(&self, days: u32) -> Result<UsageSnapshot, ApiError> {
        let url = self.url("/api/stats");
        debug!("GET {}?days={}", url, days);

        let resp = self
            .client
            .get(&url)
            .query(&[("days", days)])
            .send()
            .await?;
        let body = read_success_body(resp).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn upload(&self, request: UploadRequest) -> Result<StoredFile, ApiError> {
        let url = self.url("/api/upload");
        debug!(
            "POST {} ({} bytes, type={})",
            url,
            request.bytes.len(),
            request.category.as_str()
        );

        let part = Part::bytes(request.bytes).file_name(request.file_name);
        let form = Form::new()
            .part("file", part)
            .text("type", request.category.as_str());

        let reply: UploadEnvelope = self
            .send_for_envelope(self.client.post(&url).multipart(form))
            .await?;
        reply.envelope.into_result()?;

        if reply.filepath.is_empty() {
            return Err(ApiError::Decode("upload response has no filepath".into()));
        }
        Ok(StoredFile {
            filename: reply.filename,
            filepath: reply.filepath,
        })
    }

    async fn joined_groups(&self) -> Result<Vec<JoinedGroup>, ApiError> {
        let url = self.url("/api/groups/whatsapp");
        debug!("GET {}", url);

        let reply: JoinedGroupsEnvelope = self.send_for_envelope(self.client.get(&url)).await?;
        reply.envelope.into_result()?;
        Ok(reply.groups)
    }

    async fn forbidden_words(&self, group_jid: &str) -> Result<Vec<ForbiddenWord>, ApiError> {
        self.get_list("/api/forbidden_words", &[("group_jid", group_jid)])
            .await
    }

    async fn add_forbidden_word(&self, payload: &ForbiddenWordPayload) -> Result<(), ApiError> {
        let url = self.url("/api/forbidden_words");
        debug!("POST {}", url);
        self.send_envelope(self.client.post(&url).json(payload)).await
    }

    async fn delete_forbidden_word(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url("/api/forbidden_words");
        debug!("DELETE {}?id={}", url, id);
        self.send_envelope(self.client.delete(&url).query(&[("id", id)]))
            .await
    }
}
