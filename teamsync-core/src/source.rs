//! Abstraction over the document store the team records come from

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// A read-only source of the raw team record tree
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable label identifying this source
    fn label(&self) -> String;

    /// Fetch the tree at the configured path
    ///
    /// Returns `Ok(None)` when nothing is stored there.
    async fn fetch_tree(&self) -> Result<Option<Value>>;
}

/// A source serving a fixed tree, used for one-off runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tree: Option<Value>,
}

impl StaticSource {
    /// Create a source that always returns `tree`
    pub fn new(tree: Option<Value>) -> Self {
        Self { tree }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn label(&self) -> String {
        "static".to_string()
    }

    async fn fetch_tree(&self) -> Result<Option<Value>> {
        Ok(self.tree.clone())
    }
}
