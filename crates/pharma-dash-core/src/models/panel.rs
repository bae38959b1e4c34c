//! Chart panel wrapper.

use serde::Serialize;

use crate::stats::{DegenerateInput, StatsResult};

/// Output of one KPI card or chart.
///
/// A panel whose input was degenerate (an empty group, too few distinct
/// values) carries a placeholder instead of a value, so the sibling panels
/// of the same section still render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready { value: T },
    NotEnoughData { reason: String },
}

impl<T> Panel<T> {
    pub fn ready(value: T) -> Self {
        Panel::Ready { value }
    }

    /// Convert a statistics result into a panel, logging degraded panels.
    pub fn from_result(name: &str, result: StatsResult<T>) -> Self {
        match result {
            Ok(value) => Panel::Ready { value },
            Err(e) => Self::degraded(name, e),
        }
    }

    fn degraded(name: &str, error: DegenerateInput) -> Self {
        tracing::warn!(panel = name, error = %error, "panel has not enough data");
        Panel::NotEnoughData {
            reason: error.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Panel::Ready { .. })
    }

    /// The value, if the panel is ready.
    pub fn value(&self) -> Option<&T> {
        match self {
            Panel::Ready { value } => Some(value),
            Panel::NotEnoughData { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Panel<U> {
        match self {
            Panel::Ready { value } => Panel::Ready { value: f(value) },
            Panel::NotEnoughData { reason } => Panel::NotEnoughData { reason },
        }
    }
}
