//! Startup sequence shared by the binary and its tests.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use prometheus::Registry;
use tracing::info;

use crate::collector::AcmCollector;
use crate::config::Config;
use crate::error::StartupError;
use crate::service::CloudBackend;

/// Everything needed to start serving.
pub struct Exporter {
    pub addr: SocketAddr,
    pub registry: Registry,
    pub collector: AcmCollector,
}

/// Resolves the listening address, builds the collector and registers it.
///
/// The port is resolved from `port_env` (the `PORT` variable) first;
/// `load_backend` only runs once it is valid, so a bad port never reaches
/// AWS.
///
/// # Errors
///
/// Fails on an invalid port, a role that cannot be assumed, or a registry
/// conflict.
pub fn prepare<F>(
    config: &Config,
    port_env: Option<&str>,
    load_backend: F,
) -> Result<Exporter, StartupError>
where
    F: FnOnce() -> Arc<dyn CloudBackend>,
{
    let port = config.resolve_port(port_env)?;
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

    let collector = AcmCollector::new(config, load_backend())?;

    let registry = Registry::new();
    collector.register(&registry)?;
    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    info!(%addr, "exporter prepared");
    Ok(Exporter {
        addr,
        registry,
        collector,
    })
}
