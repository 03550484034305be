//! Interval features: how many days passed between purchases of an item
//! across the five-order window.
//!
//! For window position `k` (1 = most recent order) with delta `d_k` and flag
//! `b_k`:
//!
//! - positions 1..=4 yield a value only when `b_k` is set, namely the sum of
//!   deltas since the nearest more recent bought position (or since the start
//!   of the window);
//! - position 5 always yields the sum since the nearest bought position among
//!   1..=4, reading a null `d_5` as 0, and ignores `b_5`.
//!
//! The max feature reads null positions as 0. The min feature reads null
//! positions 1..=4 as [`NEVER_BOUGHT_DAYS`] and, when `d_5` itself is null
//! (fewer than five prior orders), compares against the max instead of
//! position 5.

use serde::{Deserialize, Serialize};

use crate::domain::pair::PairKeyFormat;
use crate::domain::row::FeatureRow;
use crate::features::aggregate::HistoryTable;
use crate::features::flags::{FlagTable, PairWindow};
use crate::features::WINDOW_LEN;
use crate::stage::{Cell, Column, StageTable};

pub const FEATURE_TABLE: &str = "fe_features";

/// Stand-in for "never bought in this position" when taking the minimum.
pub const NEVER_BOUGHT_DAYS: f64 = 1_000_000.0;

const FEATURE_TABLE_COLUMNS: &[Column] = &[
    Column::text("up_pair"),
    Column::integer("y"),
    Column::integer("total_buy_n5"),
    Column::real("total_buy_ratio_n5"),
    Column::real("order_ratio_by_chance_n5"),
    Column::real("useritem_order_days_max_n5"),
    Column::real("useritem_order_days_min_n5"),
];

/// How a null days-since-prior-order value behaves inside an interval sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullDaysPolicy {
    /// SQL arithmetic: a null anywhere in the sum makes the sum null.
    #[default]
    Propagate,
    /// A null delta counts as zero days.
    Zero,
}

impl std::str::FromStr for NullDaysPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "zero" => Ok(Self::Zero),
            other => Err(format!("unsupported null days policy `{other}` (expected propagate|zero)")),
        }
    }
}

impl NullDaysPolicy {
    fn add(self, total: Option<f64>, days: Option<f64>) -> Option<f64> {
        match self {
            Self::Propagate => Some(total? + days?),
            Self::Zero => Some(total.unwrap_or(0.0) + days.unwrap_or(0.0)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalFeatures {
    pub order_days: [Option<f64>; WINDOW_LEN],
    pub max: f64,
    pub min: Option<f64>,
}

pub fn order_days(window: &PairWindow, policy: NullDaysPolicy) -> [Option<f64>; WINDOW_LEN] {
    let last = WINDOW_LEN - 1;
    let mut order_days = [None; WINDOW_LEN];
    let mut elapsed = Some(0.0);

    for position in 0..last {
        elapsed = policy.add(elapsed, window.days[position]);
        if window.bought[position] {
            order_days[position] = elapsed;
            elapsed = Some(0.0);
        }
    }
    order_days[last] = policy.add(elapsed, Some(window.days[last].unwrap_or(0.0)));

    order_days
}

pub fn synthesize(window: &PairWindow, policy: NullDaysPolicy) -> IntervalFeatures {
    let order_days = order_days(window, policy);
    let last = WINDOW_LEN - 1;

    let max = order_days.iter().map(|days| days.unwrap_or(0.0)).fold(0.0, f64::max);

    let closest_earlier = order_days[..last]
        .iter()
        .map(|days| days.unwrap_or(NEVER_BOUGHT_DAYS))
        .fold(NEVER_BOUGHT_DAYS, f64::min);
    let min = match window.days[last] {
        None => Some(closest_earlier.min(max)),
        Some(_) => order_days[last].map(|days| closest_earlier.min(days)),
    };

    IntervalFeatures { order_days, max, min }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    /// Sorted by pair key.
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stage_table<'a>(&'a self, keys: &'a PairKeyFormat) -> StageTable<'a> {
        StageTable::new(
            FEATURE_TABLE,
            FEATURE_TABLE_COLUMNS,
            self.rows.iter().map(move |row| {
                vec![
                    Cell::from(keys.render_unchecked(row.pair)),
                    Cell::from(i64::from(row.y)),
                    Cell::from(i64::from(row.total_buy_n5)),
                    Cell::from(row.total_buy_ratio_n5),
                    Cell::from(row.order_ratio_by_chance_n5),
                    Cell::from(row.useritem_order_days_max_n5),
                    Cell::from(row.useritem_order_days_min_n5),
                ]
            }),
        )
    }
}

pub fn build(history: &HistoryTable, flags: &FlagTable, policy: NullDaysPolicy) -> FeatureTable {
    let rows = history
        .pairs
        .iter()
        .map(|(pair, summary)| {
            let window = flags.pairs.get(pair).copied().unwrap_or_default();
            let intervals = synthesize(&window, policy);
            FeatureRow {
                pair: *pair,
                y: summary.y,
                total_buy_n5: summary.total_buy_n5,
                total_buy_ratio_n5: summary.total_buy_ratio_n5,
                order_ratio_by_chance_n5: summary.order_ratio_by_chance_n5,
                useritem_order_days_max_n5: intervals.max,
                useritem_order_days_min_n5: intervals.min,
            }
        })
        .collect();

    FeatureTable { rows }
}

#[cfg(test)]
mod tests {
    use super::{order_days, synthesize, NullDaysPolicy, NEVER_BOUGHT_DAYS};
    use crate::features::flags::PairWindow;

    fn window(days: [Option<f64>; 5], bought: [u8; 5]) -> PairWindow {
        PairWindow { days, bought: bought.map(|flag| flag == 1) }
    }

    const FULL: [Option<f64>; 5] = [Some(19.0), Some(28.0), Some(29.0), Some(21.0), Some(15.0)];

    #[test]
    fn bought_every_time_yields_each_delta() {
        let features = synthesize(&window(FULL, [1, 1, 1, 1, 1]), NullDaysPolicy::Propagate);

        assert_eq!(
            features.order_days,
            [Some(19.0), Some(28.0), Some(29.0), Some(21.0), Some(15.0)]
        );
        assert_eq!(features.max, 29.0);
        assert_eq!(features.min, Some(15.0));
    }

    #[test]
    fn unbought_positions_accumulate_until_the_next_purchase() {
        let features = synthesize(&window(FULL, [0, 1, 0, 1, 0]), NullDaysPolicy::Propagate);

        assert_eq!(features.order_days, [None, Some(47.0), None, Some(50.0), Some(15.0)]);
        assert_eq!(features.max, 50.0);
        assert_eq!(features.min, Some(15.0));
    }

    #[test]
    fn oldest_position_ignores_its_own_flag() {
        let bought = order_days(&window(FULL, [1, 0, 1, 0, 1]), NullDaysPolicy::Propagate);
        let unbought = order_days(&window(FULL, [1, 0, 1, 0, 0]), NullDaysPolicy::Propagate);

        assert_eq!(bought, [Some(19.0), None, Some(57.0), None, Some(36.0)]);
        assert_eq!(bought, unbought);
    }

    #[test]
    fn never_bought_in_window_sums_every_delta() {
        let features = synthesize(&window(FULL, [0, 0, 0, 0, 0]), NullDaysPolicy::Propagate);

        assert_eq!(features.order_days, [None, None, None, None, Some(112.0)]);
        assert_eq!(features.max, 112.0);
        assert_eq!(features.min, Some(112.0));
    }

    #[test]
    fn bought_only_in_the_oldest_of_three_orders() {
        // Three prior orders with deltas [null, 10, 7] oldest to newest.
        let days = [Some(7.0), Some(10.0), None, None, None];
        let flags = [0, 0, 1, 0, 0];

        let sql = synthesize(&window(days, flags), NullDaysPolicy::Propagate);
        assert_eq!(sql.order_days, [None, None, None, None, None]);
        assert_eq!(sql.max, 0.0);
        assert_eq!(sql.min, Some(0.0));

        let zero = synthesize(&window(days, flags), NullDaysPolicy::Zero);
        assert_eq!(zero.order_days, [None, None, Some(17.0), None, Some(0.0)]);
        assert_eq!(zero.max, 17.0);
        assert_eq!(zero.min, Some(17.0));
    }

    #[test]
    fn short_history_minimum_falls_back_to_the_maximum() {
        let days = [Some(7.0), Some(10.0), None, None, None];
        let features = synthesize(&window(days, [1, 1, 0, 0, 0]), NullDaysPolicy::Propagate);

        assert_eq!(features.order_days, [Some(7.0), Some(10.0), None, None, None]);
        assert_eq!(features.max, 10.0);
        assert_eq!(features.min, Some(7.0));
    }

    #[test]
    fn null_oldest_interval_with_known_delta_gives_null_minimum() {
        let days = [Some(3.0), None, Some(4.0), Some(5.0), Some(6.0)];
        let features = synthesize(&window(days, [0, 0, 0, 0, 0]), NullDaysPolicy::Propagate);

        assert_eq!(features.order_days[4], None);
        assert_eq!(features.max, 0.0);
        assert_eq!(features.min, None);
    }

    #[test]
    fn minimum_never_exceeds_maximum() {
        let days = [
            FULL,
            [Some(7.0), Some(10.0), None, None, None],
            [Some(0.0), Some(30.0), Some(2.0), Some(30.0), None],
        ];
        for days in days {
            for mask in 0u8..32 {
                let flags = [0, 1, 2, 3, 4].map(|bit| (mask >> bit) & 1);
                for policy in [NullDaysPolicy::Propagate, NullDaysPolicy::Zero] {
                    let features = synthesize(&window(days, flags), policy);
                    if let Some(min) = features.min {
                        assert!(min <= features.max, "min {min} > max {} for {flags:?}", features.max);
                        assert!(min < NEVER_BOUGHT_DAYS);
                    }
                }
            }
        }
    }

    #[test]
    fn policy_parses_from_config_text() {
        assert_eq!("propagate".parse::<NullDaysPolicy>(), Ok(NullDaysPolicy::Propagate));
        assert_eq!(" Zero ".parse::<NullDaysPolicy>(), Ok(NullDaysPolicy::Zero));
        assert!("ignore".parse::<NullDaysPolicy>().is_err());
    }
}
