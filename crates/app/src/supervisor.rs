//! Push-channel reconnect supervision.
//!
//! Checks the channel every few seconds; when it is down, reconnects with
//! backoff and reports every outcome to the bridge over the link channel.
//! Runs for the process lifetime — failures are retried forever.

use std::time::Duration;

use tokio::sync::{mpsc, watch};

use meticulous_domain::backoff::Backoff;

use crate::bridge::LinkEvent;
use crate::ports::push::PushChannel;

/// How often the channel is checked while it is healthy.
const CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Supervise the push channel until shutdown.
pub async fn supervise_push<S: PushChannel>(
    push: S,
    mut backoff: Backoff,
    link: mpsc::Sender<LinkEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        if push.is_connected() {
            backoff.reset();
            if sleep_or_shutdown(CHECK_INTERVAL, &mut shutdown).await {
                break;
            }
            continue;
        }

        tracing::info!("attempting to reconnect push channel");
        match push.connect().await {
            Ok(()) => {
                backoff.reset();
                let _ = link.send(LinkEvent::SocketUp).await;
            }
            Err(err) => {
                let delay = backoff.next_delay();
                tracing::warn!(
                    %err,
                    attempt = backoff.attempt(),
                    retry_in_secs = delay.as_secs_f64(),
                    "push channel reconnection failed"
                );
                let _ = link
                    .send(LinkEvent::SocketDown {
                        error: Some(err.to_string()),
                    })
                    .await;
                if sleep_or_shutdown(delay, &mut shutdown).await {
                    break;
                }
            }
        }
    }
    tracing::debug!("push supervisor stopped");
}

/// Sleep for `duration`, returning `true` when shutdown fired first.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(duration) => false,
        _ = shutdown.changed() => *shutdown.borrow(),
    }
}
