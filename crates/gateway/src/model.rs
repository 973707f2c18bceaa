/// One selectable model.
///
/// Ordering matters wherever descriptors travel as a list: the first entry
/// is the default selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    /// Requires a previously configured credential before selection.
    pub gated: bool,
    /// Whether the credential requirement (if any) is satisfied.
    pub available: bool,
}

impl ModelDescriptor {
    /// Creates an ungated, immediately selectable descriptor.
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gated: false,
            available: true,
        }
    }

    /// Creates a gated descriptor pending credential setup.
    pub fn gated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gated: true,
            available: false,
        }
    }

    /// True when the descriptor may be the active selection.
    pub fn selectable(&self) -> bool {
        !self.gated || self.available
    }
}

/// Where a catalog's models came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCatalogSource {
    BackendApi,
    StaticFallback,
}

/// Ordered model list plus provenance.
///
/// A fallback catalog carries a warning so the caller renders a connectivity
/// notice instead of the normal greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub models: Vec<ModelDescriptor>,
    pub source: ModelCatalogSource,
    pub warning: Option<String>,
}

impl ModelCatalog {
    pub fn from_backend_api(models: Vec<ModelDescriptor>) -> Self {
        Self {
            models,
            source: ModelCatalogSource::BackendApi,
            warning: None,
        }
    }

    pub fn from_static_fallback(warning: String) -> Self {
        Self {
            models: fallback_models(),
            source: ModelCatalogSource::StaticFallback,
            warning: Some(warning),
        }
    }

    /// First descriptor, the default selection.
    pub fn default_selection(&self) -> Option<&ModelDescriptor> {
        self.models.first()
    }

    /// First descriptor a selection may revert to.
    pub fn first_unrestricted(&self) -> Option<&ModelDescriptor> {
        self.models.iter().find(|model| model.selectable())
    }

    pub fn descriptor(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|model| model.name == name)
    }
}

/// Fixed set substituted when live model discovery fails.
pub fn fallback_models() -> Vec<ModelDescriptor> {
    [
        "llama2",
        "llama2:7b",
        "llama2:13b",
        "codellama",
        "mistral",
        "phi",
        "neural-chat",
    ]
    .into_iter()
    .map(ModelDescriptor::open)
    .collect()
}

/// Why a selection was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRejection {
    UnknownModel { name: String },
    GatedUnavailable { name: String },
}

impl std::fmt::Display for SelectionRejection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownModel { name } => {
                write!(formatter, "model '{name}' is not in the current catalog")
            }
            Self::GatedUnavailable { name } => {
                write!(formatter, "model '{name}' requires credential setup")
            }
        }
    }
}
