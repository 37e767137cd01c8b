use crate::config::Config;
use crate::upstream::UpstreamClient;

/// Per-process shared state handed to every request handler.
///
/// Holds only the upstream client; requests carry no state of their own
/// and nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            upstream: UpstreamClient::new(&config.upstream_base),
        }
    }
}
