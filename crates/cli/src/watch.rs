//! The polling decision loop.
//!
//! Consumes qualifying changes from the event source, advances the debounce
//! state, redraws the status line every tick, and fires the action exactly
//! once per settled burst.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{Receiver, TryRecvError};
use settle_watcher::{ChangeEvent, DebounceState, DEFAULT_POLL_INTERVAL, DEFAULT_QUIET_THRESHOLD};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::action::{ActionOutcome, ActionRunner};
use crate::status::{done_banner, fire_banner, StatusLine};

/// Loop configuration.
#[derive(Debug, Clone)]
pub struct WatchOpts {
    /// Quiet time a burst needs before the action fires.
    pub quiet_threshold: Duration,
    /// Tick cadence of the loop.
    pub poll_interval: Duration,
}

impl Default for WatchOpts {
    fn default() -> Self {
        Self {
            quiet_threshold: DEFAULT_QUIET_THRESHOLD,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Run the loop until `shutdown` resolves or the event source closes.
///
/// The action runs inline and blocks the loop for its whole duration.
/// Changes that land meanwhile wait in the channel; the next tick drains
/// them and re-opens the quiet window, so nothing is lost to a slow build.
pub async fn run<A: ActionRunner>(
    events: Receiver<ChangeEvent>,
    mut action: A,
    opts: WatchOpts,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<()> {
    let mut state = DebounceState::new(Instant::now());
    let mut status = StatusLine::new();
    let mut ticker = tokio::time::interval(opts.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                if !drain(&events, &mut state) {
                    debug!("event source closed");
                    break;
                }

                let now = Instant::now();
                if state.claim_fire(now, opts.quiet_threshold) {
                    let quiet = state.quiet_for(now);
                    let outcome = status.suspend(|| {
                        println!("{}", fire_banner(quiet));
                        let outcome = action.run();
                        println!("{}", done_banner());
                        outcome
                    });
                    if let ActionOutcome::Failed(reason) = outcome {
                        warn!(%reason, "action failed; watch continues");
                    }
                } else {
                    status.render(state.phase(now, opts.quiet_threshold), state.triggered());
                }
            }
        }
    }

    status.finish();
    Ok(())
}

/// Pull every buffered change into the state.
///
/// Returns `false` once the source channel has closed; buffered changes are
/// still drained first.
fn drain(events: &Receiver<ChangeEvent>, state: &mut DebounceState) -> bool {
    loop {
        match events.try_recv() {
            Ok(change) => state.record_change(change.at),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}
