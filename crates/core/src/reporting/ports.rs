//! Port interfaces for reporting

use std::collections::HashSet;

use async_trait::async_trait;
use patrolarc_domain::Result;

/// Supplies the inspect types that count as valid working time.
///
/// Backed by master data or configuration; the cancel sentinel is never
/// expected to be part of the set.
#[async_trait]
pub trait ValidTypeProvider: Send + Sync {
    /// Currently active valid inspect types.
    async fn active_valid_types(&self) -> Result<HashSet<String>>;

    /// Drop any cached state so the next read sees fresh master data.
    async fn refresh(&self) -> Result<()> {
        Ok(())
    }
}
