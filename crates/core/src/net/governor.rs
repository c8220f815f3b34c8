//! Tiered rate governor for all outbound GET calls.
//!
//! Every tier delegates to the mechanism of the tier above it after applying
//! its own policy: confirm → budget → pacing → bounded concurrency. The tier
//! is chosen once at construction and dispatched through a single match over
//! the tier state.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::level::NetworkLevel;
use super::prompt::Prompter;
use super::transport::Transport;
use super::types::{ApiResponse, NetError};

/// Upper bound on concurrently executing outbound requests, at any level.
pub const MAX_IN_FLIGHT: usize = 10;

/// Mutable state of the tier selected at construction.
///
/// Each guarded tier carries its own lock so its critical section (prompt,
/// budget check, pacing wait) serializes independently.
enum TierState {
    /// Level 0: ask before every download.
    Ask { ask_lock: Mutex<()> },
    /// Level 1: cumulative byte budget; over budget degrades to asking.
    BudgetGated {
        ask_lock: Mutex<()>,
        budget_bytes: u64,
        used_bytes: Mutex<u64>,
    },
    /// Level 2: fixed delay between request starts.
    Paced,
    /// Level 3: no delay, bounded concurrency only.
    Bounded,
}

/// Gatekeeper for all outbound GET calls.
///
/// Owns one [`NetworkLevel`] for its lifetime and the transport handle all
/// concurrent tasks share. Must be closed exactly once after every fetch has
/// completed; dropping an unclosed governor is flagged loudly.
pub struct NetGovernor<T: Transport, P: Prompter> {
    transport: T,
    prompter: P,
    level: &'static NetworkLevel,
    tier: TierState,
    delay: Duration,
    /// Pacing guard and timestamp in one: holding the lock is the Tier 2
    /// critical section, the value is when the last request completed.
    last_request: Mutex<Instant>,
    gate: Semaphore,
    closed: AtomicBool,
}

impl<T: Transport, P: Prompter> NetGovernor<T, P> {
    /// Creates a governor for the given level.
    ///
    /// `data_limit_bytes` only matters at level 1, `delay` at levels 0 to 2
    /// (and for bypass fetches below level 3).
    pub fn new(
        transport: T,
        prompter: P,
        level: &'static NetworkLevel,
        delay: Duration,
        data_limit_bytes: u64,
    ) -> Self {
        let tier = match level.ordinal {
            0 => TierState::Ask {
                ask_lock: Mutex::new(()),
            },
            1 => TierState::BudgetGated {
                ask_lock: Mutex::new(()),
                budget_bytes: data_limit_bytes,
                used_bytes: Mutex::new(0),
            },
            2 => TierState::Paced,
            _ => TierState::Bounded,
        };

        // Backdated so the first paced request goes out immediately.
        let last_request = Instant::now()
            .checked_sub(delay)
            .unwrap_or_else(Instant::now);

        debug!(level = level.ordinal, "Initialized NetGovernor");
        Self {
            transport,
            prompter,
            level,
            tier,
            delay,
            last_request: Mutex::new(last_request),
            gate: Semaphore::new(MAX_IN_FLIGHT),
            closed: AtomicBool::new(false),
        }
    }

    /// The level this governor was constructed with.
    pub fn level(&self) -> &'static NetworkLevel {
        self.level
    }

    /// Full url for an api path, for callers building log lines.
    pub fn full_url(&self, api_path: &str) -> String {
        self.transport.full_url(api_path)
    }

    /// GET an api path through the governing tier.
    ///
    /// With `bypass` set, confirmation and budget logic is skipped: level 3
    /// goes straight to the bounded mechanism, every other level through the
    /// pacing delay. Used for one-off bootstrap requests outside the main
    /// loop.
    ///
    /// A non-2xx status is returned, not raised; only transport failures
    /// surface as [`NetError`].
    pub async fn fetch(&self, api_path: &str, bypass: bool) -> Result<ApiResponse, NetError> {
        if bypass {
            return if self.level.ordinal == 3 {
                self.bounded(api_path).await
            } else {
                self.paced(api_path).await
            };
        }

        match &self.tier {
            TierState::Ask { ask_lock } => self.confirmed(api_path, ask_lock).await,
            TierState::BudgetGated {
                ask_lock,
                budget_bytes,
                used_bytes,
            } => {
                self.budgeted(api_path, ask_lock, *budget_bytes, used_bytes)
                    .await
            }
            TierState::Paced => self.paced(api_path).await,
            TierState::Bounded => self.bounded(api_path).await,
        }
    }

    /// Tier 0 mechanism: serialized yes/no prompt; yes delegates to pacing,
    /// anything else yields a synthetic not-sent response.
    async fn confirmed(
        &self,
        api_path: &str,
        ask_lock: &Mutex<()>,
    ) -> Result<ApiResponse, NetError> {
        let url = self.transport.full_url(api_path);
        let accepted = {
            let _serialized = ask_lock.lock().await;
            self.prompter
                .confirm(&format!("Download {}? (Y/n): ", url))
                .await
        };

        if accepted {
            self.paced(api_path).await
        } else {
            info!("Not getting {}", url);
            Ok(ApiResponse::not_sent(url))
        }
    }

    /// Tier 1 mechanism: tracks cumulative response bytes under its own
    /// guard; once usage exceeds the budget, requests degrade to the
    /// confirmation path. Usage updates after every completed request, real
    /// or synthetic.
    async fn budgeted(
        &self,
        api_path: &str,
        ask_lock: &Mutex<()>,
        budget_bytes: u64,
        used_bytes: &Mutex<u64>,
    ) -> Result<ApiResponse, NetError> {
        let mut used = used_bytes.lock().await;

        let response = if *used > budget_bytes {
            warn!("Downloads over the limit! ({}/{} bytes)", *used, budget_bytes);
            self.confirmed(api_path, ask_lock).await?
        } else {
            self.paced(api_path).await?
        };

        *used += response.body.len() as u64;
        info!("Used data so far: {}/{} bytes", *used, budget_bytes);
        Ok(response)
    }

    /// Tier 2 mechanism: no two requests begin less than `delay` apart,
    /// globally. The wait happens while holding the pacing guard, so
    /// concurrent callers queue behind it.
    async fn paced(&self, api_path: &str) -> Result<ApiResponse, NetError> {
        let mut last_request = self.last_request.lock().await;

        let wait = (*last_request + self.delay).saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            info!("sleeping for {:.3} s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }

        let response = self.bounded(api_path).await?;
        *last_request = Instant::now();
        Ok(response)
    }

    /// Tier 3 mechanism: requests run concurrently up to [`MAX_IN_FLIGHT`];
    /// a caller at the bound parks on the gate until a slot frees. The
    /// permit is released on drop, so a failing request frees its slot too.
    async fn bounded(&self, api_path: &str) -> Result<ApiResponse, NetError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| NetError::ConnectionFailed("in-flight gate closed".to_string()))?;

        info!("GET: {}", self.transport.full_url(api_path));
        self.transport.get(api_path).await
    }

    /// Releases the transport. Call exactly once, after all fetches have
    /// completed; repeated calls are ignored with a warning.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("NetGovernor already closed");
            return;
        }
        self.transport.close().await;
        debug!("NetGovernor closed");
    }
}

impl<T: Transport, P: Prompter> Drop for NetGovernor<T, P> {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            error!(
                "NetGovernor dropped without close() (potential resource leak)! \
                 hint: call close() after all fetches complete, in a position \
                 that runs regardless of task outcomes"
            );
            // Dropping the transport releases the client as best effort.
        }
    }
}
