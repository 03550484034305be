use serde::{Deserialize, Serialize};

use crate::domain::pair::PairKey;

/// Output columns, in export order.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "up_pair",
    "y",
    "total_buy_n5",
    "total_buy_ratio_n5",
    "order_ratio_by_chance_n5",
    "useritem_order_days_max_n5",
    "useritem_order_days_min_n5",
];

/// Final training row for one (user, item) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub pair: PairKey,
    pub y: u8,
    pub total_buy_n5: u32,
    pub total_buy_ratio_n5: f64,
    pub order_ratio_by_chance_n5: f64,
    pub useritem_order_days_max_n5: f64,
    /// Null when the accumulated interval for the oldest window slot is null.
    pub useritem_order_days_min_n5: Option<f64>,
}

/// Renders a real the way the export format expects: shortest round-trip
/// digits, with `.0` kept on integral values.
pub fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub fn format_optional_real(value: Option<f64>) -> String {
    value.map(format_real).unwrap_or_default()
}
