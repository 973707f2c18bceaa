use std::sync::Arc;
use std::time::Duration;

use sypha_gateway::HttpChatBackend;

use crate::chat::orchestrator::ChatOrchestrator;
use crate::config::AppConfig;
use crate::viewport::ViewPort;

/// Wires the configured HTTP backend into a ready orchestrator.
pub async fn bootstrap<V: ViewPort>(config: &AppConfig, viewport: V) -> ChatOrchestrator<V> {
    let backend = HttpChatBackend::new(
        config.base_url.clone(),
        Duration::from_secs(config.discovery_timeout_secs),
    );

    let mut orchestrator = ChatOrchestrator::new(Arc::new(backend), viewport);
    orchestrator.initialize().await;
    orchestrator
}
