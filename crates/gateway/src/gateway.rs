use std::sync::Arc;

use crate::backend::{ChatBackend, EmptyModelListSnafu, GatewayError, GatewayResult};
use crate::model::{ModelCatalog, ModelDescriptor, SelectionRejection};

/// Model discovery, defaulting, and gating policy.
///
/// The gateway always holds a usable catalog: before the first load and
/// after any failed load it carries the static fallback set, so the caller
/// is never left without a selectable model.
pub struct ModelGateway {
    backend: Arc<dyn ChatBackend>,
    catalog: ModelCatalog,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            catalog: ModelCatalog::from_static_fallback(
                "models not loaded yet".to_string(),
            ),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Loads the model list, substituting the fixed fallback set on any
    /// transport failure, error status, or empty payload.
    ///
    /// Never fails outward; the catalog source tells the caller whether to
    /// render the greeting or a connectivity notice.
    pub async fn load_models(&mut self) -> &ModelCatalog {
        self.catalog = match self.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    fallback_model_count = crate::model::fallback_models().len(),
                    "model discovery failed; serving static fallback models"
                );
                ModelCatalog::from_static_fallback(error.to_string())
            }
        };
        &self.catalog
    }

    async fn fetch_catalog(&self) -> Result<ModelCatalog, GatewayError> {
        let models = self.backend.fetch_models().await?;
        if models.is_empty() {
            return EmptyModelListSnafu {
                stage: "load-models",
            }
            .fail();
        }
        Ok(ModelCatalog::from_backend_api(models))
    }

    /// First descriptor of the current catalog.
    pub fn default_selection(&self) -> Option<&ModelDescriptor> {
        self.catalog.default_selection()
    }

    /// Rejects unknown models and gated models whose credential is missing.
    pub fn validate_selection(&self, name: &str) -> Result<(), SelectionRejection> {
        let Some(descriptor) = self.catalog.descriptor(name) else {
            return Err(SelectionRejection::UnknownModel {
                name: name.to_string(),
            });
        };

        if !descriptor.selectable() {
            return Err(SelectionRejection::GatedUnavailable {
                name: name.to_string(),
            });
        }

        Ok(())
    }

    /// Descriptor a rejected selection reverts to.
    pub fn revert_target(&self) -> Option<&ModelDescriptor> {
        self.catalog.first_unrestricted()
    }

    /// Runs the credential-setup flow for a gated model; on success the
    /// model becomes selectable.
    pub async fn complete_credential_setup(&mut self, name: &str) -> GatewayResult<()> {
        self.backend.setup_credential(name).await?;

        if let Some(descriptor) = self
            .catalog
            .models
            .iter_mut()
            .find(|descriptor| descriptor.name == name)
        {
            descriptor.available = true;
            tracing::info!(model = %name, "credential setup completed; model unlocked");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        BoxFuture, ChatReply, ChatRequest, ExportFormat, MediaArtifact, MediaJob, SessionSummary,
        StoredMessage,
    };
    use crate::model::ModelCatalogSource;

    /// Scripted backend: either a fixed model list or a wire failure.
    struct ScriptedBackend {
        models: Option<Vec<ModelDescriptor>>,
        credential_accepted: bool,
    }

    impl ScriptedBackend {
        fn with_models(models: Vec<ModelDescriptor>) -> Self {
            Self {
                models: Some(models),
                credential_accepted: true,
            }
        }

        fn failing() -> Self {
            Self {
                models: None,
                credential_accepted: false,
            }
        }

        fn wire_failure(stage: &'static str) -> GatewayError {
            GatewayError::Application {
                stage,
                message: "scripted wire failure".to_string(),
            }
        }
    }

    impl ChatBackend for ScriptedBackend {
        fn fetch_models<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<ModelDescriptor>>> {
            Box::pin(async move {
                match &self.models {
                    Some(models) => Ok(models.clone()),
                    None => Err(Self::wire_failure("fetch-models")),
                }
            })
        }

        fn send_chat<'a>(
            &'a self,
            _request: ChatRequest,
        ) -> BoxFuture<'a, GatewayResult<ChatReply>> {
            Box::pin(async move { Err(Self::wire_failure("send-chat")) })
        }

        fn create_session<'a>(&'a self) -> BoxFuture<'a, GatewayResult<String>> {
            Box::pin(async move { Ok("s-1".to_string()) })
        }

        fn delete_session<'a>(&'a self, _session_id: &'a str) -> BoxFuture<'a, GatewayResult<()>> {
            Box::pin(async move { Ok(()) })
        }

        fn load_session<'a>(
            &'a self,
            _session_id: &'a str,
        ) -> BoxFuture<'a, GatewayResult<Vec<StoredMessage>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn list_sessions<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<SessionSummary>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn export_session<'a>(
            &'a self,
            _session_id: &'a str,
            _format: ExportFormat,
        ) -> BoxFuture<'a, GatewayResult<Vec<u8>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn request_media<'a>(
            &'a self,
            _job: MediaJob,
        ) -> BoxFuture<'a, GatewayResult<MediaArtifact>> {
            Box::pin(async move {
                Ok(MediaArtifact {
                    url: "http://example/media".to_string(),
                })
            })
        }

        fn setup_credential<'a>(&'a self, _model: &'a str) -> BoxFuture<'a, GatewayResult<()>> {
            Box::pin(async move {
                if self.credential_accepted {
                    Ok(())
                } else {
                    Err(Self::wire_failure("setup-credential"))
                }
            })
        }
    }

    #[tokio::test]
    async fn failed_discovery_serves_the_fixed_fallback_list() {
        let mut gateway = ModelGateway::new(Arc::new(ScriptedBackend::failing()));

        let catalog = gateway.load_models().await;

        assert_eq!(catalog.source, ModelCatalogSource::StaticFallback);
        assert!(catalog.warning.is_some());
        assert_eq!(catalog.models, crate::model::fallback_models());
        assert_eq!(gateway.default_selection().unwrap().name, "llama2");
    }

    #[tokio::test]
    async fn empty_payload_counts_as_discovery_failure() {
        let mut gateway = ModelGateway::new(Arc::new(ScriptedBackend::with_models(Vec::new())));

        let catalog = gateway.load_models().await;

        assert_eq!(catalog.source, ModelCatalogSource::StaticFallback);
    }

    #[tokio::test]
    async fn gated_unavailable_model_is_rejected_until_credential_setup() {
        let mut gateway = ModelGateway::new(Arc::new(ScriptedBackend::with_models(vec![
            ModelDescriptor::open("m1"),
            ModelDescriptor::gated("restricted-x"),
        ])));
        gateway.load_models().await;

        assert_eq!(
            gateway.validate_selection("restricted-x"),
            Err(SelectionRejection::GatedUnavailable {
                name: "restricted-x".to_string()
            })
        );
        assert_eq!(gateway.revert_target().unwrap().name, "m1");

        gateway
            .complete_credential_setup("restricted-x")
            .await
            .unwrap();

        assert_eq!(gateway.validate_selection("restricted-x"), Ok(()));
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let mut gateway = ModelGateway::new(Arc::new(ScriptedBackend::with_models(vec![
            ModelDescriptor::open("m1"),
        ])));
        gateway.load_models().await;

        assert!(matches!(
            gateway.validate_selection("nope"),
            Err(SelectionRejection::UnknownModel { .. })
        ));
    }
}
