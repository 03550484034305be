//! Purchase-history aggregation over the full `prior` history of each pair.

use std::collections::{BTreeMap, HashMap};

use crate::domain::order::UserId;
use crate::domain::pair::{PairKey, PairKeyFormat};
use crate::features::pairs::PairSet;
use crate::features::WINDOW_LEN;
use crate::stage::{Cell, Column, StageTable};

pub const HISTORY_TABLE: &str = "fe_pair_history";

const HISTORY_COLUMNS: &[Column] = &[
    Column::text("up_pair"),
    Column::integer("user_id"),
    Column::integer("product_id"),
    Column::integer("y"),
    Column::integer("total_buy_n5"),
    Column::real("total_buy_ratio_n5"),
    Column::integer("max_order_number_rev"),
    Column::real("order_ratio_by_chance_n5"),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairHistory {
    pub y: u8,
    /// Purchases within the user's `WINDOW_LEN` most recent orders.
    pub total_buy_n5: u32,
    pub total_buy_ratio_n5: f64,
    /// Recency rank of the pair's oldest purchase; 1 is the most recent order.
    pub max_order_number_rev: i64,
    pub order_ratio_by_chance_n5: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryTable {
    pub pairs: BTreeMap<PairKey, PairHistory>,
}

impl HistoryTable {
    pub fn positives(&self) -> usize {
        self.pairs.values().filter(|history| history.y == 1).count()
    }

    pub fn stage_table<'a>(&'a self, keys: &'a PairKeyFormat) -> StageTable<'a> {
        StageTable::new(
            HISTORY_TABLE,
            HISTORY_COLUMNS,
            self.pairs.iter().map(move |(pair, history)| {
                vec![
                    Cell::from(keys.render_unchecked(*pair)),
                    Cell::from(pair.user.0),
                    Cell::from(pair.item.0),
                    Cell::from(i64::from(history.y)),
                    Cell::from(i64::from(history.total_buy_n5)),
                    Cell::from(history.total_buy_ratio_n5),
                    Cell::from(history.max_order_number_rev),
                    Cell::from(history.order_ratio_by_chance_n5),
                ]
            }),
        )
    }
}

#[derive(Default)]
struct Tally {
    recent: u32,
    max_rev: i64,
}

pub fn aggregate(pairs: &PairSet) -> HistoryTable {
    let mut max_by_user = HashMap::<UserId, i64>::new();
    for purchase in &pairs.purchases {
        max_by_user
            .entry(purchase.pair.user)
            .and_modify(|max| *max = (*max).max(purchase.order_number))
            .or_insert(purchase.order_number);
    }

    let window = WINDOW_LEN as i64;
    let mut tallies = BTreeMap::<PairKey, Tally>::new();
    for purchase in &pairs.purchases {
        let max_order_number =
            max_by_user.get(&purchase.pair.user).copied().unwrap_or(purchase.order_number);
        let order_number_rev = 1 + max_order_number - purchase.order_number;

        let tally = tallies.entry(purchase.pair).or_default();
        if order_number_rev <= window {
            tally.recent += 1;
        }
        tally.max_rev = tally.max_rev.max(order_number_rev);
    }

    let pairs = tallies
        .into_iter()
        .map(|(pair, tally)| {
            let y = u8::from(pairs.labels.contains(&pair));
            (pair, summarize(y, tally.recent, tally.max_rev))
        })
        .collect();

    HistoryTable { pairs }
}

/// The "by chance" ratio divides by the number of orders the user actually
/// had in which to buy the item when that is fewer than the window.
pub fn summarize(y: u8, total_buy_n5: u32, max_order_number_rev: i64) -> PairHistory {
    let window = WINDOW_LEN as f64;
    let total = f64::from(total_buy_n5);
    let total_buy_ratio_n5 = total / window;
    let order_ratio_by_chance_n5 = if max_order_number_rev > WINDOW_LEN as i64 {
        total / window
    } else {
        total / max_order_number_rev as f64
    };

    PairHistory {
        y,
        total_buy_n5,
        total_buy_ratio_n5,
        max_order_number_rev,
        order_ratio_by_chance_n5,
    }
}
