//! Per-window purchase flags: was the pair's item in each of the user's five
//! most recent orders.

use std::collections::{BTreeMap, HashSet};

use crate::domain::order::{ItemId, OrderId, OrderItem};
use crate::domain::pair::{PairKey, PairKeyFormat};
use crate::features::aggregate::HistoryTable;
use crate::features::recency::RecencyIndex;
use crate::features::WINDOW_LEN;
use crate::stage::{Cell, Column, StageTable};

pub const FLAGS_TABLE: &str = "fe_window_flags";

const FLAGS_COLUMNS: &[Column] = &[
    Column::text("up_pair"),
    Column::real("days_since_prior_order_n1"),
    Column::real("days_since_prior_order_n2"),
    Column::real("days_since_prior_order_n3"),
    Column::real("days_since_prior_order_n4"),
    Column::real("days_since_prior_order_n5"),
    Column::integer("bought_n1"),
    Column::integer("bought_n2"),
    Column::integer("bought_n3"),
    Column::integer("bought_n4"),
    Column::integer("bought_n5"),
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PairWindow {
    pub days: [Option<f64>; WINDOW_LEN],
    pub bought: [bool; WINDOW_LEN],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlagTable {
    pub pairs: BTreeMap<PairKey, PairWindow>,
}

impl FlagTable {
    pub fn stage_table<'a>(&'a self, keys: &'a PairKeyFormat) -> StageTable<'a> {
        StageTable::new(
            FLAGS_TABLE,
            FLAGS_COLUMNS,
            self.pairs.iter().map(move |(pair, window)| {
                let mut row = Vec::with_capacity(FLAGS_COLUMNS.len());
                row.push(Cell::from(keys.render_unchecked(*pair)));
                row.extend(window.days.iter().map(|days| Cell::from(*days)));
                row.extend(window.bought.iter().map(|bought| Cell::from(*bought)));
                row
            }),
        )
    }
}

/// Each window position is checked on its own, so flags need not be contiguous.
pub fn flag(history: &HistoryTable, recency: &RecencyIndex, prior_items: &[OrderItem]) -> FlagTable {
    let bought: HashSet<(OrderId, ItemId)> =
        prior_items.iter().map(|item| (item.order_id, item.item_id)).collect();

    let pairs = history
        .pairs
        .keys()
        .map(|pair| {
            let window = match recency.get(pair.user) {
                Some(window) => PairWindow {
                    days: window.days(),
                    bought: window.order_ids().map(|order_id| {
                        order_id.is_some_and(|order_id| bought.contains(&(order_id, pair.item)))
                    }),
                },
                None => PairWindow::default(),
            };
            (*pair, window)
        })
        .collect();

    FlagTable { pairs }
}
