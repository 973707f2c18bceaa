use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use snafu::ResultExt;

use crate::backend::{
    ApplicationSnafu, BoxFuture, ChatBackend, ChatReply, ChatRequest, ExportFormat, GatewayResult,
    MediaArtifact, MediaJob, PayloadSnafu, SessionSummary, StatusSnafu, StoredMessage,
    TransportSnafu,
};
use crate::model::ModelDescriptor;

/// Listing payloads may carry bare names or full descriptors; older backends
/// only send names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelEntry {
    Name(String),
    Descriptor {
        name: String,
        #[serde(default)]
        gated: bool,
        #[serde(default)]
        available: Option<bool>,
    },
}

impl ModelEntry {
    fn into_descriptor(self) -> ModelDescriptor {
        match self {
            Self::Name(name) => ModelDescriptor::open(name),
            Self::Descriptor {
                name,
                gated,
                available,
            } => ModelDescriptor {
                name,
                gated,
                // Gated entries default to unavailable until credential setup.
                available: available.unwrap_or(!gated),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelsEnvelope {
    success: bool,
    #[serde(default)]
    models: Vec<ModelEntry>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<ChatReply>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    success: bool,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionMessagesEnvelope {
    success: bool,
    #[serde(default)]
    messages: Vec<StoredMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionListEnvelope {
    success: bool,
    #[serde(default)]
    sessions: Vec<SessionSummary>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaEnvelope {
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Backend client over the application's REST surface.
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
    /// Applied to model discovery only; chat requests run until the
    /// transport itself resolves or errors.
    discovery_timeout: Duration,
}

impl HttpChatBackend {
    pub fn new(base_url: impl Into<String>, discovery_timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            discovery_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_body(
        response: reqwest::Response,
        stage: &'static str,
    ) -> GatewayResult<String> {
        let status = response.status();
        let body = response.text().await.context(TransportSnafu { stage })?;

        if !status.is_success() {
            return StatusSnafu {
                stage,
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        Ok(body)
    }

    fn application_failure(
        error: Option<String>,
        stage: &'static str,
    ) -> crate::backend::GatewayError {
        ApplicationSnafu {
            stage,
            message: error.unwrap_or_else(|| "unknown error".to_string()),
        }
        .build()
    }
}

impl ChatBackend for HttpChatBackend {
    fn fetch_models<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<ModelDescriptor>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url("/api/models"))
                .timeout(self.discovery_timeout)
                .send()
                .await
                .context(TransportSnafu {
                    stage: "fetch-models-send",
                })?;

            let body = Self::read_body(response, "fetch-models-status").await?;
            let envelope: ModelsEnvelope = serde_json::from_str(&body).context(PayloadSnafu {
                stage: "fetch-models-parse",
            })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "fetch-models"));
            }

            Ok(envelope
                .models
                .into_iter()
                .map(ModelEntry::into_descriptor)
                .collect())
        })
    }

    fn send_chat<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, GatewayResult<ChatReply>> {
        Box::pin(async move {
            let mut form = reqwest::multipart::Form::new()
                .text("message", request.message)
                .text("model", request.model);

            if let Some(attachment) = request.attachment {
                form = form.part(
                    "file",
                    reqwest::multipart::Part::bytes(attachment.bytes)
                        .file_name(attachment.file_name),
                );
            }

            let response = self
                .client
                .post(self.url("/api/chat"))
                .multipart(form)
                .send()
                .await
                .context(TransportSnafu {
                    stage: "send-chat-send",
                })?;

            let body = Self::read_body(response, "send-chat-status").await?;
            let envelope: ChatEnvelope = serde_json::from_str(&body).context(PayloadSnafu {
                stage: "send-chat-parse",
            })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "send-chat"));
            }

            envelope.message.ok_or_else(|| {
                Self::application_failure(
                    Some("missing message in successful reply".to_string()),
                    "send-chat",
                )
            })
        })
    }

    fn create_session<'a>(&'a self) -> BoxFuture<'a, GatewayResult<String>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("/api/session/new"))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "create-session-send",
                })?;

            let body = Self::read_body(response, "create-session-status").await?;
            let envelope: SessionEnvelope = serde_json::from_str(&body).context(PayloadSnafu {
                stage: "create-session-parse",
            })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "create-session"));
            }

            envelope.session_id.ok_or_else(|| {
                Self::application_failure(
                    Some("missing session id".to_string()),
                    "create-session",
                )
            })
        })
    }

    fn delete_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move {
            let response = self
                .client
                .delete(self.url(&format!("/api/session/{session_id}/delete")))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "delete-session-send",
                })?;

            let body = Self::read_body(response, "delete-session-status").await?;
            let envelope: AckEnvelope = serde_json::from_str(&body).context(PayloadSnafu {
                stage: "delete-session-parse",
            })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "delete-session"));
            }
            Ok(())
        })
    }

    fn load_session<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<StoredMessage>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url(&format!("/api/session/{session_id}/load")))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "load-session-send",
                })?;

            let body = Self::read_body(response, "load-session-status").await?;
            let envelope: SessionMessagesEnvelope =
                serde_json::from_str(&body).context(PayloadSnafu {
                    stage: "load-session-parse",
                })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "load-session"));
            }
            Ok(envelope.messages)
        })
    }

    fn list_sessions<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<SessionSummary>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url("/api/sessions"))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "list-sessions-send",
                })?;

            let body = Self::read_body(response, "list-sessions-status").await?;
            let envelope: SessionListEnvelope =
                serde_json::from_str(&body).context(PayloadSnafu {
                    stage: "list-sessions-parse",
                })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "list-sessions"));
            }
            Ok(envelope.sessions)
        })
    }

    fn export_session<'a>(
        &'a self,
        session_id: &'a str,
        format: ExportFormat,
    ) -> BoxFuture<'a, GatewayResult<Vec<u8>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url(&format!(
                    "/api/session/{session_id}/export/{}",
                    format.as_str()
                )))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "export-session-send",
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return StatusSnafu {
                    stage: "export-session-status",
                    status: status.as_u16(),
                    body,
                }
                .fail();
            }

            let bytes = response.bytes().await.context(TransportSnafu {
                stage: "export-session-read",
            })?;
            Ok(bytes.to_vec())
        })
    }

    fn request_media<'a>(&'a self, job: MediaJob) -> BoxFuture<'a, GatewayResult<MediaArtifact>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url(&format!("/api/generate/{}", job.kind.as_str())))
                .json(&json!({ "prompt": job.prompt }))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "request-media-send",
                })?;

            let body = Self::read_body(response, "request-media-status").await?;
            let envelope: MediaEnvelope = serde_json::from_str(&body).context(PayloadSnafu {
                stage: "request-media-parse",
            })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "request-media"));
            }

            envelope
                .url
                .map(|url| MediaArtifact { url })
                .ok_or_else(|| {
                    Self::application_failure(
                        Some("missing media url".to_string()),
                        "request-media",
                    )
                })
        })
    }

    fn setup_credential<'a>(&'a self, model: &'a str) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("/api/credentials/setup"))
                .json(&json!({ "model": model }))
                .send()
                .await
                .context(TransportSnafu {
                    stage: "setup-credential-send",
                })?;

            let body = Self::read_body(response, "setup-credential-status").await?;
            let envelope: AckEnvelope = serde_json::from_str(&body).context(PayloadSnafu {
                stage: "setup-credential-parse",
            })?;

            if !envelope.success {
                return Err(Self::application_failure(envelope.error, "setup-credential"));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_entries_become_open_descriptors() {
        let envelope: ModelsEnvelope =
            serde_json::from_str(r#"{"success": true, "models": ["llama2", "mistral"]}"#).unwrap();

        let models: Vec<ModelDescriptor> = envelope
            .models
            .into_iter()
            .map(ModelEntry::into_descriptor)
            .collect();
        assert_eq!(models, vec![
            ModelDescriptor::open("llama2"),
            ModelDescriptor::open("mistral"),
        ]);
    }

    #[test]
    fn gated_entries_default_to_unavailable() {
        let envelope: ModelsEnvelope = serde_json::from_str(
            r#"{"success": true, "models": [{"name": "restricted-x", "gated": true}]}"#,
        )
        .unwrap();

        let descriptor = envelope
            .models
            .into_iter()
            .map(ModelEntry::into_descriptor)
            .next()
            .unwrap();
        assert!(descriptor.gated);
        assert!(!descriptor.available);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let backend = HttpChatBackend::new("http://localhost:5000/", Duration::from_secs(10));
        assert_eq!(backend.url("/api/models"), "http://localhost:5000/api/models");
    }
}
