use std::sync::Arc;

use crate::{
    configs::Config,
    proxy::{ProxyPool, RefreshTrigger},
    resolver::StreamResolver,
    sources::MetadataProvider,
};

/// Top-level application state shared by every route.
pub struct AppState {
    pub config: Config,
    pub pool: Arc<ProxyPool>,
    pub resolver: Arc<StreamResolver>,
    pub metadata: Arc<dyn MetadataProvider>,
    /// `None` when proxying is disabled and no scheduler runs.
    pub refresh: Option<RefreshTrigger>,
}
