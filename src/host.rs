//! Optional embedding-host signal. The funnel may run inside a messenger
//! web-app shell that hands over an initialization payload at startup; its
//! absence is only logged.

use std::env;

use tracing::{info, warn};

pub trait HostContext {
    fn init_payload(&self) -> Option<String>;
}

/// Default capability when no embedding host is present.
pub struct NoHost;

impl HostContext for NoHost {
    fn init_payload(&self) -> Option<String> {
        None
    }
}

/// Host payload handed over through the environment by the embedding shell.
pub struct EnvHost;

impl HostContext for EnvHost {
    fn init_payload(&self) -> Option<String> {
        env::var("WEBAPP_INIT_DATA").ok().filter(|v| !v.is_empty())
    }
}

pub fn announce(host: &impl HostContext) {
    match host.init_payload() {
        Some(payload) => info!("Embedding host payload: {payload}"),
        None => warn!("Embedding host context is not available"),
    }
}
