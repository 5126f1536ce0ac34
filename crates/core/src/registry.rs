//! Aggregation of tool provider catalogs into one flat namespace.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display};

use abacus_model::ModelTool;
use serde_json::Value;

use crate::tool::{self, OpDescriptor, ToolProvider};

/// An error raised while building the registry. Always fatal: a
/// registry is either complete or not built at all.
#[derive(Clone, Debug)]
pub enum Error {
    /// A configured provider could not be reached or refused to list
    /// its catalog.
    Unreachable {
        /// The provider's diagnostic label.
        provider: String,
        /// What went wrong.
        reason: String,
    },
    /// Two providers advertised the same operation name.
    CatalogCollision {
        /// The colliding operation name.
        operation: String,
        /// The provider that registered the name first.
        first_provider: String,
        /// The provider that tried to register it again.
        second_provider: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unreachable { provider, reason } => {
                write!(f, "provider `{provider}` is unreachable: {reason}")
            }
            Error::CatalogCollision {
                operation,
                first_provider,
                second_provider,
            } => write!(
                f,
                "operation `{operation}` is advertised by both \
                 `{first_provider}` and `{second_provider}`"
            ),
        }
    }
}

impl StdError for Error {}

struct Route {
    provider_idx: usize,
    descriptor: OpDescriptor,
}

/// A flat catalog of every operation advertised by the configured tool
/// providers, with an uniform invocation entry point.
///
/// The catalog is built once at startup and is read-only afterwards.
/// The default registry is empty: nothing to advertise, nothing to
/// invoke.
#[derive(Default)]
pub struct Registry {
    providers: Vec<Box<dyn ToolProvider>>,
    routes: HashMap<String, Route>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("routes", &self.routes.keys())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Connects to every given provider, fetching and merging their
    /// catalogs.
    ///
    /// Fails with [`Error::Unreachable`] if any provider cannot deliver
    /// its catalog (no partial catalog is accepted), and with
    /// [`Error::CatalogCollision`] if two providers advertise the same
    /// operation name.
    pub async fn connect(
        providers: Vec<Box<dyn ToolProvider>>,
    ) -> Result<Self, Error> {
        let mut routes: HashMap<String, Route> = HashMap::new();
        for (provider_idx, provider) in providers.iter().enumerate() {
            let name = provider.provider_name();
            let catalog =
                provider.catalog().await.map_err(|err| Error::Unreachable {
                    provider: name.to_owned(),
                    reason: err.to_string(),
                })?;
            debug!("fetched {} operation(s) from `{name}`", catalog.len());

            for descriptor in catalog {
                if let Some(existing) = routes.get(&descriptor.name) {
                    let first = providers[existing.provider_idx]
                        .provider_name()
                        .to_owned();
                    return Err(Error::CatalogCollision {
                        operation: descriptor.name,
                        first_provider: first,
                        second_provider: name.to_owned(),
                    });
                }
                info!("registered operation `{}` from `{name}`", descriptor.name);
                routes.insert(
                    descriptor.name.clone(),
                    Route {
                        provider_idx,
                        descriptor,
                    },
                );
            }
        }
        Ok(Self { providers, routes })
    }

    /// Returns the merged catalog as tool definitions for a model
    /// request.
    pub fn definitions(&self) -> Vec<ModelTool> {
        let mut tools: Vec<ModelTool> = self
            .routes
            .values()
            .map(|route| ModelTool {
                name: route.descriptor.name.clone(),
                description: route.descriptor.description.clone(),
                parameters: route.descriptor.parameters.clone(),
            })
            .collect();
        // The map iteration order is arbitrary; keep requests stable.
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Returns whether the named operation is in the merged catalog.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Invokes the named operation, routing it to the provider that
    /// advertised it.
    ///
    /// Fails closed with an `UnknownOperation` error if the name is not
    /// in the merged catalog.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, tool::Error> {
        let Some(route) = self.routes.get(name) else {
            warn!("operation not found: {name}");
            return Err(tool::Error::unknown_operation()
                .with_reason(format!("no operation named `{name}`")));
        };
        let provider = &self.providers[route.provider_idx];
        trace!(
            "routing `{name}` to `{}` with args: {arguments:?}",
            provider.provider_name()
        );
        provider.invoke(name, arguments).await
    }
}
