use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use shared_database::SharedStore;
use shared_models::Notification;

use crate::services::sender::NotificationSender;
use crate::{CycleReport, DispatchError, DispatcherConfig, SendError};

/// Marks a cycle as running for as long as it is alive.
struct CycleGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Background process that moves due notifications from `pending` to
/// `sent` or `failed`. Only one cycle runs at a time.
pub struct NotificationDispatcher {
    store: SharedStore,
    sender: Arc<dyn NotificationSender>,
    config: DispatcherConfig,
    cycle_in_progress: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(
        store: SharedStore,
        sender: Arc<dyn NotificationSender>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            store,
            sender,
            config,
            cycle_in_progress: AtomicBool::new(false),
        }
    }

    /// Polls on the configured interval until `shutdown` flips to `true`
    /// or its sender is dropped.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting notification dispatcher (poll interval {:?})",
            self.config.poll_interval
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("Shutdown channel closed");
                        break;
                    }
                }
                _ = interval.tick() => {
                    match self.dispatch_due(Utc::now(), Some(&shutdown)).await {
                        Ok(report) if report.due > 0 => {
                            info!(
                                "Dispatch cycle finished: due={}, sent={}, failed={}, skipped={}, update_errors={}",
                                report.due, report.sent, report.failed, report.skipped, report.update_errors
                            );
                        }
                        Ok(_) => debug!("No notifications due"),
                        Err(e) => error!("notification dispatcher error: {}", e),
                    }
                }
            }
        }

        info!("Notification dispatcher stopped");
    }

    /// Runs a single cycle against `now`.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleReport, DispatchError> {
        self.dispatch_due(now, None).await
    }

    #[instrument(skip(self, shutdown))]
    async fn dispatch_due(
        &self,
        now: DateTime<Utc>,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<CycleReport, DispatchError> {
        let _guard = CycleGuard::acquire(&self.cycle_in_progress)
            .ok_or(DispatchError::CycleInProgress)?;

        let due = match timeout(self.config.operation_timeout, self.store.list_due_notifications(now)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DispatchError::Timeout {
                    timeout: self.config.operation_timeout,
                })
            }
        };

        let mut report = CycleReport {
            due: due.len(),
            ..CycleReport::default()
        };

        for notification in &due {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                info!(
                    "Shutdown requested - leaving {} notifications for the next run",
                    report.due - report.processed()
                );
                report.interrupted = true;
                break;
            }

            self.deliver(notification, &mut report).await;
        }

        Ok(report)
    }

    async fn deliver(&self, notification: &Notification, report: &mut CycleReport) {
        let op_timeout = self.config.operation_timeout;

        let outcome = match timeout(op_timeout, self.sender.send(notification)).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout { timeout: op_timeout }),
        };

        let transition = match &outcome {
            Ok(()) => timeout(op_timeout, self.store.mark_notification_sent(notification.id)).await,
            Err(e) => {
                warn!(
                    "Failed to send {} notification {}: {}",
                    notification.kind, notification.id, e
                );
                timeout(
                    op_timeout,
                    self.store.mark_notification_failed(notification.id, &e.to_string()),
                )
                .await
            }
        };

        match transition {
            Ok(Ok(true)) if outcome.is_ok() => report.sent += 1,
            Ok(Ok(true)) => report.failed += 1,
            Ok(Ok(false)) => {
                debug!("Notification {} was no longer pending", notification.id);
                report.skipped += 1;
            }
            Ok(Err(e)) => {
                error!("Failed to record outcome for notification {}: {}", notification.id, e);
                report.update_errors += 1;
            }
            Err(_) => {
                error!(
                    "Recording outcome for notification {} timed out after {:?}",
                    notification.id, op_timeout
                );
                report.update_errors += 1;
            }
        }
    }
}
