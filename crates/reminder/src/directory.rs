//! Static operator directory loaded from YAML.
//!
//! ```yaml
//! operators:
//!   - id: alice
//!     email: alice@corp.com
//!   - id: bob
//!     full_name: Bob Builder
//!     email: bob          # completed with MAIL_DEFAULT_SUFFIX
//! ```

use std::collections::HashMap;
use std::path::Path;

use nodenag_core::{Operator, OperatorId};
use serde::Deserialize;

use crate::cluster::UserDirectory;
use crate::error::ClusterError;

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    operators: Vec<Operator>,
}

/// In-memory operator directory. Never creates entries.
#[derive(Debug, Default)]
pub struct FileDirectory {
    operators: HashMap<OperatorId, Operator>,
}

impl FileDirectory {
    pub fn from_operators(operators: impl IntoIterator<Item = Operator>) -> Self {
        let mut map = HashMap::new();
        for operator in operators {
            if let Some(previous) = map.insert(operator.id.clone(), operator) {
                tracing::warn!(operator = %previous.id, "duplicate operator entry, keeping the last one");
            }
        }
        Self { operators: map }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ClusterError> {
        let file: DirectoryFile = serde_yaml::from_str(yaml)
            .map_err(|e| ClusterError::Directory(format!("invalid operators file: {e}")))?;
        Ok(Self::from_operators(file.operators))
    }

    pub fn load(path: &Path) -> Result<Self, ClusterError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ClusterError::Directory(format!("cannot read {}: {e}", path.display()))
        })?;
        let directory = Self::from_yaml_str(&yaml)?;
        tracing::info!(path = %path.display(), operators = directory.len(), "loaded operator directory");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[async_trait::async_trait]
impl UserDirectory for FileDirectory {
    async fn resolve_user(
        &self,
        id: &OperatorId,
        create_if_missing: bool,
    ) -> Result<Option<Operator>, ClusterError> {
        if create_if_missing && !self.operators.contains_key(id) {
            tracing::warn!(operator = %id, "file directory is read-only, not creating user");
        }
        Ok(self.operators.get(id).cloned())
    }
}
