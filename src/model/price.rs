use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Simulated quote for one ticker. All three fields are stored at display
/// precision (2 decimals).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceState {
    pub price: f64,
    pub change: f64,
    pub percent_change: f64,
}

impl PriceState {
    /// Freshly seeded state: no movement yet.
    pub fn seeded(price: f64) -> Self {
        Self {
            price,
            change: 0.0,
            percent_change: 0.0,
        }
    }

    /// Non-negative change counts as "up", matching how cards are colored.
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

/// Ticker symbol -> latest simulated state. Entries are only ever added or
/// updated; unsubscribed tickers keep their last value.
pub type PriceTable = HashMap<String, PriceState>;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(252.499_999_9), 252.5);
        assert_eq!(round2(-1.234), -1.23);
        assert_eq!(round2(0.005), 0.01);
    }

    #[test]
    fn seeded_state_has_no_movement() {
        let state = PriceState::seeded(250.0);
        assert_eq!(state.change, 0.0);
        assert_eq!(state.percent_change, 0.0);
        assert!(state.is_up());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_string(&PriceState::seeded(1.0)).unwrap();
        assert!(json.contains("percentChange"));
    }
}
