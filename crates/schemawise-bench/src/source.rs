use async_trait::async_trait;
use schemawise_core::Result;

/// A single open connection that can run a statement and discard its result
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> Result<()>;
}

/// Hands out independent connections, one per benchmark worker
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn connect(&self) -> Result<Box<dyn QueryExecutor>>;
}
