//! NAT-PMP gateway discovery
//!
//! Discovery probes the default gateway with an external address request on
//! Tokio's blocking pool and races it against a [`CancellationToken`]. The
//! probe itself cannot be interrupted: cancelling only stops waiting for it.
//! An abandoned probe keeps its blocking thread until the gateway answers or
//! the client's retransmission schedule runs out, and its result is dropped.

use super::client::{PmpClient, UdpPmpClient};
use super::gateway::find_default_gateway;
use super::natpmp::NatPmpDevice;
use super::types::NatError;
use crate::config::NatPmpConfig;
use std::net::Ipv4Addr;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Look for a NAT-PMP gateway on the local network
///
/// Resolves the gateway synchronously (or uses `config.gateway`) and fails
/// without starting any task when there is none. Otherwise the returned
/// receiver yields the device once the gateway answered a probe; it closes
/// without a value if the probe failed or `cancel` fired first.
///
/// Must be called from within a Tokio runtime.
pub fn discover_natpmp(
    config: &NatPmpConfig,
    cancel: CancellationToken,
) -> Result<oneshot::Receiver<NatPmpDevice<UdpPmpClient>>, NatError> {
    config.validate()?;
    let gateway = match config.gateway {
        Some(gateway) => gateway,
        None => find_default_gateway()?,
    };

    let client_config = config.clone();
    Ok(discover_natpmp_with(
        gateway,
        move |gateway| Ok(UdpPmpClient::new(gateway, &client_config)),
        config,
        cancel,
    ))
}

/// Probe `gateway` with a client built by `connect`
///
/// Same delivery rules as [`discover_natpmp`].
pub fn discover_natpmp_with<C, F>(
    gateway: Ipv4Addr,
    connect: F,
    config: &NatPmpConfig,
    cancel: CancellationToken,
) -> oneshot::Receiver<NatPmpDevice<C>>
where
    C: PmpClient + Send + 'static,
    F: FnOnce(Ipv4Addr) -> Result<C, NatError> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let config = config.clone();

    debug!("Probing {} for NAT-PMP", gateway);
    let probe = tokio::task::spawn_blocking(move || {
        let client = connect(gateway)?;
        let response = client.external_address()?;
        Ok::<_, NatError>((client, response))
    });

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("NAT-PMP discovery on {} cancelled, abandoning probe", gateway);
            }
            joined = probe => match joined {
                Ok(Ok((client, response))) => {
                    info!(
                        "Found NAT-PMP gateway {} (external address {})",
                        gateway, response.external_ip
                    );
                    if tx.send(NatPmpDevice::new(client, gateway, &config)).is_err() {
                        debug!("NAT-PMP discovery result dropped, receiver gone");
                    }
                }
                Ok(Err(e)) => debug!("Gateway {} did not answer NAT-PMP: {}", gateway, e),
                Err(e) => warn!("NAT-PMP probe task failed: {}", e),
            },
        }
    });

    rx
}
