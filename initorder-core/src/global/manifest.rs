//! JSON run-before/run-after manifests.
//!
//! ```json
//! {
//!     "Network": { "after": ["Logger"] },
//!     "Logger": { "before": ["Audio"] }
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{dependency_list, global_order, GlobalOrder, Run, RunBeforeList};
use crate::error::Result;

/// Declarations of one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDeclarations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
}

impl RunDeclarations {
    fn runs(&self) -> impl Iterator<Item = Run<String>> + '_ {
        self.before
            .iter()
            .cloned()
            .map(Run::Before)
            .chain(self.after.iter().cloned().map(Run::After))
    }
}

/// Run declarations for a set of named types, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunManifest {
    types: IndexMap<String, RunDeclarations>,
}

impl RunManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add declarations for `ty`, merging with any already present.
    pub fn declare(&mut self, ty: impl Into<String>, declarations: RunDeclarations) -> &mut Self {
        let entry = self.types.entry(ty.into()).or_default();
        entry.before.extend(declarations.before);
        entry.after.extend(declarations.after);
        self
    }

    /// Normalized run-before relation of the manifest.
    pub fn dependency_list(&self) -> RunBeforeList<String> {
        dependency_list(
            self.types
                .iter()
                .map(|(ty, declarations)| (ty.clone(), declarations.runs())),
        )
    }

    /// Order every type in the manifest.
    pub fn execution_order(&self) -> Result<GlobalOrder<String>> {
        Ok(global_order(&self.dependency_list())?)
    }
}
