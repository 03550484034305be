pub mod aggregate;
pub mod flags;
pub mod intervals;
pub mod pairs;
pub mod recency;

/// Number of most recent orders the `_n5` features look at.
pub const WINDOW_LEN: usize = 5;

pub use aggregate::{HistoryTable, PairHistory};
pub use flags::{FlagTable, PairWindow};
pub use intervals::{FeatureTable, IntervalFeatures, NullDaysPolicy};
pub use pairs::{PairSet, PriorPurchase};
pub use recency::{RecencyIndex, RecentOrderWindow, WindowSlot};
