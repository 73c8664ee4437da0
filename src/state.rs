use crate::{upstream::UpstreamClient, utils::Config};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self {
            upstream: Arc::new(upstream),
            config: Arc::new(config),
        })
    }
}
