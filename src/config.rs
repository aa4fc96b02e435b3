//! Graph construction settings

use crate::graph::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

/// Initial sizing and identity of a new graph.
///
/// Capacities are hints; every store rounds its capacity up to a power of
/// two and grows on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreGraphConfig {
    /// Graph id. A random UUID is used when absent.
    pub id: Option<String>,
    pub vertex_capacity: usize,
    pub link_capacity: usize,
    pub edge_capacity: usize,
    pub transaction_capacity: usize,
    pub attribute_capacity: usize,
}

impl Default for StoreGraphConfig {
    fn default() -> Self {
        Self {
            id: None,
            vertex_capacity: 64,
            link_capacity: 256,
            edge_capacity: 256,
            transaction_capacity: 256,
            attribute_capacity: 16,
        }
    }
}

impl StoreGraphConfig {
    pub fn from_yaml_str(text: &str) -> GraphResult<Self> {
        serde_yaml::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> GraphResult<Self> {
        serde_json::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The configured id, or a fresh UUID v4.
    pub fn resolve_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}
