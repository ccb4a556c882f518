//! Async control seam over the blocking SOAP client
//!
//! [`SonosEqController`] runs each `SetEQ` call on the blocking pool, bounds it
//! with a timeout, and retries transport failures according to a
//! [`RetryPolicy`]. HTTP error answers are never retried.

use std::time::Duration;

use async_trait::async_trait;
use sonos_api::{ControlError, EqCommand, RetryPolicy, SoapClientConfig, SonosClient};
use tracing::{debug, warn};

use crate::config::BridgeConfig;

/// Sends EQ commands to a speaker
#[async_trait]
pub trait EqController: Send + Sync {
    async fn set_eq(&self, host: &str, command: EqCommand) -> Result<(), ControlError>;
}

/// [`EqController`] backed by [`SonosClient`]
#[derive(Debug, Clone)]
pub struct SonosEqController {
    client: SonosClient,
    timeout: Duration,
    retry: RetryPolicy,
}

impl SonosEqController {
    pub fn new(client: SonosClient, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    /// Controller using the timeout and retry settings from `config`
    pub fn from_config(config: &BridgeConfig) -> Self {
        let timeout = config.control_timeout();
        let client = SonosClient::with_config(soap_config_within(timeout));
        Self::new(client, timeout, config.control_retry_policy())
    }

    /// One `SetEQ` call on the blocking pool, bounded by `self.timeout`.
    ///
    /// Timing out abandons the blocking call but does not cancel it, so a
    /// retry may reach the speaker while the first request is still in
    /// flight. `SetEQ` is idempotent. Clients built by
    /// [`SonosEqController::from_config`] keep their connect and read timeouts
    /// within the same budget to narrow that overlap.
    async fn attempt(&self, host: &str, command: EqCommand) -> Result<(), ControlError> {
        let client = self.client.clone();
        let host_owned = host.to_string();
        let call = tokio::task::spawn_blocking(move || client.set_eq(&host_owned, command));

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ControlError::Transport(format!(
                "Control task failed: {}",
                join_error
            ))),
            Err(_) => Err(ControlError::Timeout(self.timeout)),
        }
    }
}

/// SOAP client settings whose connect and read timeouts together fit in `budget`
fn soap_config_within(budget: Duration) -> SoapClientConfig {
    let defaults = SoapClientConfig::default();
    let connect_timeout = defaults.connect_timeout.min(budget / 2);
    SoapClientConfig {
        connect_timeout,
        read_timeout: budget.saturating_sub(connect_timeout),
        ..defaults
    }
}

impl Default for SonosEqController {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

#[async_trait]
impl EqController for SonosEqController {
    async fn set_eq(&self, host: &str, command: EqCommand) -> Result<(), ControlError> {
        let mut attempt = 0;
        loop {
            match self.attempt(host, command).await {
                Ok(()) => {
                    debug!(
                        "SetEQ {} to {} succeeded on {}",
                        command.kind, command.desired_value, host
                    );
                    return Ok(());
                }
                Err(e) => {
                    attempt += 1;
                    if !self.retry.should_retry(attempt, &e) {
                        return Err(e);
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        "SetEQ {} on {} failed ({}), retrying in {:?}",
                        command.kind, host, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
