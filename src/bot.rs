//! Poll loop module
//!
//! Owns the store handle and the scanner, and cycles over the tracked set
//! until the shutdown signal fires.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::database::Database;
use crate::reddit::CommentSource;
use crate::scanner::{ScanError, Scanner};

/// The poll loop. Two states: Idle while the tracked set is empty, Scanning
/// otherwise; the transition is re-evaluated from the store on every cycle.
pub struct Bot<S> {
    database: Arc<Database>,
    scanner: Scanner<S>,
    idle_interval: Duration,
    cycle_interval: Duration,
}

impl<S: CommentSource> Bot<S> {
    pub fn new(
        database: Arc<Database>,
        scanner: Scanner<S>,
        idle_interval: Duration,
        cycle_interval: Duration,
    ) -> Self {
        Self {
            database,
            scanner,
            idle_interval,
            cycle_interval,
        }
    }

    /// Run poll cycles until `shutdown` flips to true.
    ///
    /// Users are scanned sequentially; any scan failure aborts the run and
    /// propagates. The cycle delay keeps repeated full scans from hammering
    /// the comment source.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ScanError> {
        loop {
            if *shutdown.borrow() {
                info!("Shutdown requested, stopping poll loop");
                return Ok(());
            }

            let users = self.database.get_users()?;
            if users.is_empty() {
                info!("No user to scan found");
                if wait_or_shutdown(self.idle_interval, &mut shutdown).await {
                    return Ok(());
                }
                continue;
            }

            info!("Scanning {} tracked users", users.len());
            for user in &users {
                self.scanner.scan(&user.username).await?;
            }

            if wait_or_shutdown(self.cycle_interval, &mut shutdown).await {
                return Ok(());
            }
        }
    }
}

/// Sleep for `interval`, returning early with true if shutdown fires.
///
/// A dropped sender counts as a shutdown request: `changed()` then resolves
/// immediately on every call, and ignoring it would skip the sleep and turn
/// the poll loop into a busy spin.
async fn wait_or_shutdown(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => false,
        changed = shutdown.changed() => match changed {
            Ok(()) => *shutdown.borrow(),
            Err(_) => true,
        },
    }
}
