//! Multi-tier fixed-window rate limiting.
//!
//! Each tier is an independent quota bucket (capacity over a window). An
//! admission checks every gating tier and either consumes one unit from all
//! of them or none of them.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use taskgen_core::{InvokeError, InvokeResult};
use tracing::{debug, warn};

/// Definition of a single quota tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierConfig {
    /// Tier name referenced by admission keys.
    pub name: String,
    /// Maximum admitted calls per window.
    pub capacity: u32,
    /// Window length.
    pub window: Duration,
}

impl TierConfig {
    /// Create a tier definition.
    pub fn new(name: impl Into<String>, capacity: u32, window: Duration) -> Self {
        Self {
            name: name.into(),
            capacity,
            window,
        }
    }
}

/// The decision for one admission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Every gating tier had budget; one unit was consumed from each.
    Allowed,
    /// At least one gating tier is exhausted; nothing was consumed.
    Denied {
        /// The most-constraining exhausted tier.
        tier: String,
        /// Time until that tier's window resets.
        retry_after: Duration,
    },
}

impl Admission {
    /// Check whether the call was admitted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Point-in-time usage of one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierUsage {
    /// Tier name.
    pub name: String,
    /// Units consumed in the active window.
    pub used: u32,
    /// Tier capacity.
    pub capacity: u32,
}

/// Mutable window state, guarded per tier.
#[derive(Debug)]
struct TierState {
    count: u32,
    window_start: Instant,
}

#[derive(Debug)]
struct Tier {
    config: TierConfig,
    state: Mutex<TierState>,
}

/// Tracks consumption against a fixed set of independent quota tiers.
///
/// Tier instances live for the process lifetime. Admission locks every
/// gating tier in a fixed order (broadest window first, then name), so the
/// check-and-increment over the full key set is atomic relative to every
/// other admission and denial reasons are reproducible.
#[derive(Debug)]
pub struct RateLimiter {
    tiers: Vec<Tier>,
}

impl RateLimiter {
    /// Create a limiter from validated tier definitions.
    #[must_use]
    pub fn new(configs: Vec<TierConfig>) -> Self {
        let now = Instant::now();
        let mut tiers: Vec<Tier> = configs
            .into_iter()
            .map(|config| Tier {
                config,
                state: Mutex::new(TierState {
                    count: 0,
                    window_start: now,
                }),
            })
            .collect();
        // Fixed check order: broadest window first, name as tie-breaker.
        tiers.sort_by(|a, b| {
            b.config
                .window
                .cmp(&a.config.window)
                .then_with(|| a.config.name.cmp(&b.config.name))
        });
        Self { tiers }
    }

    /// Decide admission for a call gated by the named tiers.
    ///
    /// All-or-nothing: when any gating tier is exhausted the call is denied
    /// and no tier's count moves. `retry_after` on denial is the longest
    /// time-until-reset among the exhausted tiers.
    ///
    /// # Errors
    /// Returns `Fatal` when a key names no configured tier; a wiring bug
    /// must not bypass quotas.
    pub fn admit(&self, keys: &[&str]) -> InvokeResult<Admission> {
        let mut wanted: Vec<&str> = keys.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        // Resolve in the limiter's fixed order so locks are always taken in
        // a single global order.
        let selected: Vec<&Tier> = self
            .tiers
            .iter()
            .filter(|t| wanted.contains(&t.config.name.as_str()))
            .collect();

        if selected.len() != wanted.len() {
            let missing: Vec<&str> = wanted
                .iter()
                .filter(|k| !selected.iter().any(|t| t.config.name == **k))
                .copied()
                .collect();
            return Err(InvokeError::fatal(
                format!("unknown rate-limit tier(s): {}", missing.join(", ")),
                None,
            ));
        }

        let now = Instant::now();
        let mut guards: Vec<parking_lot::MutexGuard<'_, TierState>> =
            selected.iter().map(|t| t.state.lock()).collect();

        // Window reset is part of the same atomic sequence as the check.
        for (tier, state) in selected.iter().zip(guards.iter_mut()) {
            if now.duration_since(state.window_start) >= tier.config.window {
                state.count = 0;
                state.window_start = now;
            }
        }

        let mut constraining: Option<(&Tier, Duration)> = None;
        for (tier, state) in selected.iter().copied().zip(guards.iter()) {
            if state.count >= tier.config.capacity {
                let resets_in = (state.window_start + tier.config.window)
                    .saturating_duration_since(now);
                match constraining {
                    Some((_, current)) if current >= resets_in => {}
                    _ => constraining = Some((tier, resets_in)),
                }
            }
        }

        if let Some((tier, retry_after)) = constraining {
            warn!(
                tier = %tier.config.name,
                capacity = tier.config.capacity,
                retry_after_ms = retry_after.as_millis(),
                "Admission denied"
            );
            return Ok(Admission::Denied {
                tier: tier.config.name.clone(),
                retry_after,
            });
        }

        for state in &mut guards {
            state.count += 1;
        }

        debug!(tiers = wanted.len(), "Admission granted");
        Ok(Admission::Allowed)
    }

    /// Current usage of every tier, in check order.
    #[must_use]
    pub fn usage(&self) -> Vec<TierUsage> {
        let now = Instant::now();
        self.tiers
            .iter()
            .map(|tier| {
                let state = tier.state.lock();
                let used = if now.duration_since(state.window_start) >= tier.config.window {
                    0
                } else {
                    state.count
                };
                TierUsage {
                    name: tier.config.name.clone(),
                    used,
                    capacity: tier.config.capacity,
                }
            })
            .collect()
    }

    /// Units consumed in the named tier's active window.
    #[must_use]
    pub fn used(&self, name: &str) -> Option<u32> {
        self.usage().into_iter().find(|u| u.name == name).map(|u| u.used)
    }
}
