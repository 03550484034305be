//! Pair extraction: the universe of (user, item) pairs to score, taken from
//! `prior` history, and the positive-label set taken from `train`.

use std::collections::BTreeSet;

use crate::domain::history::{OrderHistory, OrderIndex};
use crate::domain::order::OrderItem;
use crate::domain::pair::{PairKey, PairKeyFormat};
use crate::errors::DomainError;
use crate::stage::{Cell, Column, StageTable};

pub const LABEL_TABLE: &str = "fe_label_pairs";
pub const PURCHASE_TABLE: &str = "fe_prior_purchases";

const LABEL_COLUMNS: &[Column] =
    &[Column::text("up_pair"), Column::integer("user_id"), Column::integer("product_id")];

const PURCHASE_COLUMNS: &[Column] = &[
    Column::text("up_pair"),
    Column::integer("user_id"),
    Column::integer("product_id"),
    Column::integer("order_number"),
];

/// One `prior` item row joined to its order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriorPurchase {
    pub pair: PairKey,
    pub order_number: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PairSet {
    /// Sorted by (user, item); one entry per item row, so a pair repeats once
    /// per order it was bought in.
    pub purchases: Vec<PriorPurchase>,
    pub labels: BTreeSet<PairKey>,
    /// Prior item rows whose order id is absent from `orders`.
    pub dropped_prior_items: usize,
    /// Train item rows whose order id is absent from `orders`.
    pub dropped_train_items: usize,
}

impl PairSet {
    pub fn label_table<'a>(&'a self, keys: &'a PairKeyFormat) -> StageTable<'a> {
        StageTable::new(
            LABEL_TABLE,
            LABEL_COLUMNS,
            self.labels.iter().map(move |pair| {
                vec![
                    Cell::from(keys.render_unchecked(*pair)),
                    Cell::from(pair.user.0),
                    Cell::from(pair.item.0),
                ]
            }),
        )
    }

    pub fn purchase_table<'a>(&'a self, keys: &'a PairKeyFormat) -> StageTable<'a> {
        StageTable::new(
            PURCHASE_TABLE,
            PURCHASE_COLUMNS,
            self.purchases.iter().map(move |purchase| {
                vec![
                    Cell::from(keys.render_unchecked(purchase.pair)),
                    Cell::from(purchase.pair.user.0),
                    Cell::from(purchase.pair.item.0),
                    Cell::from(purchase.order_number),
                ]
            }),
        )
    }

    /// Label pairs that never appear in prior history and so get no row.
    pub fn train_only_pairs(&self) -> usize {
        let history =
            self.purchases.iter().map(|purchase| purchase.pair).collect::<BTreeSet<_>>();
        self.labels.iter().filter(|pair| !history.contains(pair)).count()
    }
}

pub fn extract(
    history: &OrderHistory,
    index: &OrderIndex<'_>,
    keys: &PairKeyFormat,
) -> Result<PairSet, DomainError> {
    let mut purchases = Vec::with_capacity(history.prior_items.len());
    let mut dropped_prior_items = 0;

    for item in &history.prior_items {
        match join(index, item) {
            Some((pair, order_number)) => {
                keys.check(pair)?;
                purchases.push(PriorPurchase { pair, order_number });
            }
            None => dropped_prior_items += 1,
        }
    }
    purchases.sort_by_key(|purchase| purchase.pair);

    let mut labels = BTreeSet::new();
    let mut dropped_train_items = 0;
    for item in &history.train_items {
        match join(index, item) {
            Some((pair, _)) => {
                keys.check(pair)?;
                labels.insert(pair);
            }
            None => dropped_train_items += 1,
        }
    }

    Ok(PairSet { purchases, labels, dropped_prior_items, dropped_train_items })
}

fn join(index: &OrderIndex<'_>, item: &OrderItem) -> Option<(PairKey, i64)> {
    index
        .get(item.order_id)
        .map(|order| (PairKey::new(order.user_id, item.item_id), order.order_number))
}
