// Copyright 2025 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed configuration the planner hands to the [`crate::join::AsOfJoinFactory`]
//! (spec §10.3). No environment variables, no files, no CLI: this operator's
//! only configuration surface is the constructor argument the plan sink
//! already supplies per spec §6's "Plan sink" contract.

/// The comparison direction the state machine implements. The spec's
/// predicate is implicitly "slave timestamp ≤ master timestamp" (the only
/// direction this operator supports); the engine's own planner for this
/// join (`AsOfJoinDesc`) models the comparison as a typed inequality
/// because the same executor shape is reused for a symmetric
/// nearest-following join. That splice variant stays a Non-goal here — this
/// enum exists so the single direction this state machine hard-codes is
/// documented at the type level rather than left implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsOfDirection {
    /// Slave timestamp ≤ master timestamp (the only direction implemented).
    Backward,
}

/// Configuration for one [`crate::join::AsOfJoinFactory`] / [`crate::join::AsOfJoinCursor`].
#[derive(Debug, Clone)]
pub struct AsOfJoinConfig {
    /// Maximum allowed `masterTs - slaveTs`. `None` disables the bound.
    pub tolerance: Option<i64>,
    /// Column index yielding the master row's timestamp.
    pub master_ts_idx: usize,
    /// Column index yielding the slave row's timestamp.
    pub slave_ts_idx: usize,
    /// Number of master columns; slave columns start here in the output row.
    pub column_split: usize,
    pub direction: AsOfDirection,
}

impl AsOfJoinConfig {
    pub fn new(master_ts_idx: usize, slave_ts_idx: usize, column_split: usize) -> Self {
        Self {
            tolerance: None,
            master_ts_idx,
            slave_ts_idx,
            column_split,
            direction: AsOfDirection::Backward,
        }
    }

    pub fn with_tolerance(mut self, tolerance: i64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// `masterTs - tolerance`, or `-infinity` when the tolerance is unbounded.
    pub fn min_slave_ts(&self, master_ts: i64) -> i64 {
        match self.tolerance {
            None => crate::row::NEG_INFINITY_TS,
            Some(tolerance) => master_ts.saturating_sub(tolerance),
        }
    }

    /// Whether `slave_ts` is still within tolerance of `master_ts`.
    pub fn within_tolerance(&self, master_ts: i64, slave_ts: i64) -> bool {
        match self.tolerance {
            None => true,
            Some(tolerance) => master_ts.saturating_sub(slave_ts) <= tolerance,
        }
    }

    /// Checked once at factory construction (spec §6: ts columns are
    /// "validated once at factory construction, not on every row"), not on
    /// every `advance`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(tolerance) = self.tolerance {
            anyhow::ensure!(tolerance >= 0, "tolerance must be non-negative, got {tolerance}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_tolerance_always_within() {
        let cfg = AsOfJoinConfig::new(0, 0, 1);
        assert!(cfg.within_tolerance(1_000_000, -1_000_000));
        assert_eq!(cfg.min_slave_ts(42), crate::row::NEG_INFINITY_TS);
    }

    #[test]
    fn finite_tolerance_bounds_both_directions() {
        let cfg = AsOfJoinConfig::new(0, 0, 1).with_tolerance(3);
        assert!(cfg.within_tolerance(10, 8));
        assert!(!cfg.within_tolerance(100, 8));
        assert_eq!(cfg.min_slave_ts(10), 7);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let cfg = AsOfJoinConfig::new(0, 0, 1).with_tolerance(-1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn no_tolerance_always_validates() {
        assert!(AsOfJoinConfig::new(0, 0, 1).validate().is_ok());
    }
}
