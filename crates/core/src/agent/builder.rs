use std::sync::Arc;

use abacus_model::ModelProvider;

use super::{Controller, ControllerConfig};
use crate::model_client::ModelClient;
use crate::registry::Registry;

/// [`Controller`] builder.
pub struct ControllerBuilder {
    model_client: ModelClient,
    registry: Option<Arc<Registry>>,
    system_prompt: Option<String>,
    config: ControllerConfig,
}

impl ControllerBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            registry: None,
            system_prompt: None,
            config: ControllerConfig::default(),
        }
    }

    /// Attaches the operation registry.
    ///
    /// Without a registry the controller still works, but advertises no
    /// operations to the model.
    #[inline]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Sets the system prompt, inserted at the start of every fresh
    /// conversation.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Overrides the default limits.
    #[inline]
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the controller.
    #[inline]
    pub fn build(self) -> Controller {
        Controller {
            model_client: self.model_client,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(Registry::default())),
            system_prompt: self.system_prompt,
            config: self.config,
        }
    }
}
