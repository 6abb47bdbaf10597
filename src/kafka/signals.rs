//! Process signals mapped onto consumer group controls.
//!
//! On unix, `SIGUSR1` toggles consumption and `SIGINT`/`SIGTERM` cancel the
//! shutdown token. Elsewhere only ctrl-c is observed.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::ControlCommand;

/// Forwards process signals until shutdown is requested.
///
/// Intended to be spawned next to [`super::ConsumerGroup::run`]:
///
/// ```rust,no_run
/// # use avrowire::kafka::{signals, ControlCommand};
/// # use tokio::sync::mpsc;
/// # use tokio_util::sync::CancellationToken;
/// # async fn demo() {
/// let shutdown = CancellationToken::new();
/// let (control_tx, _control_rx) = mpsc::channel::<ControlCommand>(8);
/// tokio::spawn(signals::forward_signals(control_tx, shutdown.clone()));
/// # }
/// ```
#[cfg(unix)]
pub async fn forward_signals(control: mpsc::Sender<ControlCommand>, shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut usr1, mut interrupt, mut terminate) = match (
        signal(SignalKind::user_defined1()),
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(usr1), Ok(interrupt), Ok(terminate)) => (usr1, interrupt, terminate),
        _ => {
            warn!("Unable to install signal handlers, falling back to ctrl-c");
            wait_for_ctrl_c(shutdown).await;
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = usr1.recv() => {
                info!("SIGUSR1 received, toggling consumption");
                if control.send(ControlCommand::Toggle).await.is_err() {
                    return;
                }
            }
            _ = interrupt.recv() => {
                info!("Terminating: via SIGINT");
                shutdown.cancel();
                return;
            }
            _ = terminate.recv() => {
                info!("Terminating: via SIGTERM");
                shutdown.cancel();
                return;
            }
        }
    }
}

/// Forwards ctrl-c as shutdown until shutdown is requested.
#[cfg(not(unix))]
pub async fn forward_signals(_control: mpsc::Sender<ControlCommand>, shutdown: CancellationToken) {
    wait_for_ctrl_c(shutdown).await;
}

async fn wait_for_ctrl_c(shutdown: CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Unable to listen for ctrl-c");
                return;
            }
            info!("Terminating: via ctrl-c");
            shutdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_forward_signals_stops_on_shutdown() {
        let shutdown = CancellationToken::new();
        let (tx, _rx) = mpsc::channel(1);
        let task = tokio::spawn(forward_signals(tx, shutdown.clone()));

        shutdown.cancel();
        let finished = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(finished.is_ok());
    }
}
