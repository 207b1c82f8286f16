//! Mutable engine state primitives.
//!
//! - [`ResourceState`]: life points clamped into `[0, maximum]`
//! - [`RollingContext`]: FIFO window of whitespace-delimited tokens
//! - [`FeedbackSnapshot`]: the previous cycle's scoring outcome

use std::collections::{BTreeMap, VecDeque};

// ─────────────────────────────────────────────────────────────────────────────
// ResourceState
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded life-point counter.
///
/// Invariant: `0 <= current <= maximum`, re-established on every update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceState {
    current: i64,
    maximum: i64,
}

/// Outcome of applying a delta to a [`ResourceState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceUpdate {
    /// Level before the update.
    pub previous: i64,
    /// Level after clamping.
    pub current: i64,
    /// Raw delta requested by the scorer.
    pub requested: i64,
}

impl ResourceUpdate {
    /// Change actually applied after clamping.
    #[must_use]
    pub fn applied(&self) -> i64 {
        self.current - self.previous
    }
}

impl ResourceState {
    /// Create a resource with the given starting level.
    ///
    /// `maximum` is raised to at least 1; `initial` is clamped into range.
    #[must_use]
    pub fn new(initial: i64, maximum: i64) -> Self {
        let maximum = maximum.max(1);
        Self {
            current: initial.clamp(0, maximum),
            maximum,
        }
    }

    /// Current level.
    #[must_use]
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Maximum level, fixed at creation.
    #[must_use]
    pub fn maximum(&self) -> i64 {
        self.maximum
    }

    /// Whether the resource has run out.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Apply a signed delta, clamping the result into `[0, maximum]`.
    pub fn apply(&mut self, delta: i64) -> ResourceUpdate {
        let previous = self.current;
        self.current = previous.saturating_add(delta).clamp(0, self.maximum);
        ResourceUpdate {
            previous,
            current: self.current,
            requested: delta,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RollingContext
// ─────────────────────────────────────────────────────────────────────────────

/// Sliding window over the accumulated transcript, measured in tokens.
///
/// Tokens are whitespace-delimited. When an append pushes the window past
/// `max_tokens`, the oldest tokens are dropped first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RollingContext {
    tokens: VecDeque<String>,
    max_tokens: usize,
}

impl RollingContext {
    /// Create an empty window holding at most `max_tokens` tokens.
    #[must_use]
    pub fn new(max_tokens: usize) -> Self {
        Self {
            tokens: VecDeque::new(),
            max_tokens,
        }
    }

    /// Create a window pre-filled with `seed`.
    #[must_use]
    pub fn seeded(max_tokens: usize, seed: &str) -> Self {
        let mut context = Self::new(max_tokens);
        context.append(seed);
        context
    }

    /// Append the tokens of `text`, evicting the oldest tokens on overflow.
    pub fn append(&mut self, text: &str) {
        self.tokens.extend(text.split_whitespace().map(str::to_string));
        while self.tokens.len() > self.max_tokens {
            let _ = self.tokens.pop_front();
        }
    }

    /// Number of tokens currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Iterate tokens oldest first.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Tokens joined by single spaces.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.tokens().collect::<Vec<_>>().join(" ")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FeedbackSnapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Previous cycle's scoring outcome, fed into the next prompt.
///
/// Overwritten every cycle and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackSnapshot {
    /// Delta requested by the scorer.
    pub delta: i64,
    /// Named contributions that summed to `delta`.
    pub factors: BTreeMap<String, i64>,
    /// Raw response text of the previous cycle.
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ResourceState ───────────────────────────────────────────────

    #[test]
    fn new_clamps_initial_level() {
        assert_eq!(ResourceState::new(150, 100).current(), 100);
        assert_eq!(ResourceState::new(-3, 100).current(), 0);
        assert_eq!(ResourceState::new(5, 0).maximum(), 1);
    }

    #[test]
    fn apply_clamps_at_zero() {
        let mut resource = ResourceState::new(5, 100);
        let update = resource.apply(-20);
        assert_eq!(update.previous, 5);
        assert_eq!(update.current, 0);
        assert_eq!(update.requested, -20);
        assert_eq!(update.applied(), -5);
        assert!(resource.is_depleted());
    }

    #[test]
    fn apply_clamps_at_maximum() {
        let mut resource = ResourceState::new(95, 100);
        let update = resource.apply(12);
        assert_eq!(update.current, 100);
        assert_eq!(update.applied(), 5);
    }

    #[test]
    fn apply_extreme_deltas_do_not_overflow() {
        let mut resource = ResourceState::new(50, 100);
        let _ = resource.apply(i64::MAX);
        assert_eq!(resource.current(), 100);
        let _ = resource.apply(i64::MIN);
        assert_eq!(resource.current(), 0);
    }

    // ── RollingContext ──────────────────────────────────────────────

    #[test]
    fn append_drops_oldest_tokens_first() {
        let mut context = RollingContext::new(4);
        context.append("one two three");
        context.append("four five six");
        assert_eq!(context.as_text(), "three four five six");
    }

    #[test]
    fn seeded_respects_window() {
        let context = RollingContext::seeded(3, "If I follow this thought");
        assert_eq!(context.as_text(), "follow this thought");
    }

    #[test]
    fn zero_capacity_stays_empty() {
        let mut context = RollingContext::new(0);
        context.append("anything at all");
        assert!(context.is_empty());
    }

    #[test]
    fn append_normalizes_whitespace() {
        let mut context = RollingContext::new(10);
        context.append("  a\n\nb\t c ");
        assert_eq!(context.tokens().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn level_always_within_bounds(
                initial in 0i64..1000,
                maximum in 1i64..1000,
                deltas in proptest::collection::vec(any::<i64>(), 0..32),
            ) {
                let mut resource = ResourceState::new(initial, maximum);
                for delta in deltas {
                    let update = resource.apply(delta);
                    prop_assert!(update.current >= 0);
                    prop_assert!(update.current <= maximum);
                    prop_assert_eq!(resource.is_depleted(), update.current <= 0);
                }
            }

            #[test]
            fn window_keeps_newest_tokens(
                max in 0usize..40,
                chunks in proptest::collection::vec(
                    proptest::collection::vec("[a-z]{1,6}", 0..10),
                    0..12,
                ),
            ) {
                let mut context = RollingContext::new(max);
                let mut all: Vec<String> = Vec::new();
                for chunk in &chunks {
                    context.append(&chunk.join(" "));
                    all.extend(chunk.iter().cloned());
                    prop_assert!(context.len() <= max);
                }
                let expected: Vec<&str> = all
                    .iter()
                    .skip(all.len().saturating_sub(max))
                    .map(String::as_str)
                    .collect();
                prop_assert_eq!(context.tokens().collect::<Vec<_>>(), expected);
            }
        }
    }
}
