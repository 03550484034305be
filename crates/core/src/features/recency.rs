//! Recency indexing: each user's most recent `prior` orders, newest first.

use std::collections::BTreeMap;

use crate::domain::history::{OrderHistory, OrderIndex};
use crate::domain::order::{OrderId, UserId};
use crate::features::WINDOW_LEN;
use crate::stage::{Cell, Column, StageTable};

pub const WINDOW_TABLE: &str = "fe_recent_orders";

const WINDOW_COLUMNS: &[Column] = &[
    Column::integer("user_id"),
    Column::integer("max_order_number"),
    Column::integer("order_id_n1"),
    Column::integer("order_id_n2"),
    Column::integer("order_id_n3"),
    Column::integer("order_id_n4"),
    Column::integer("order_id_n5"),
    Column::real("days_since_prior_order_n1"),
    Column::real("days_since_prior_order_n2"),
    Column::real("days_since_prior_order_n3"),
    Column::real("days_since_prior_order_n4"),
    Column::real("days_since_prior_order_n5"),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSlot {
    pub order_id: OrderId,
    pub days_since_prior_order: Option<f64>,
}

/// Slot `k` (0-based) holds the order numbered `max_order_number - k`, or
/// `None` when that number is below 1 or has no order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecentOrderWindow {
    pub max_order_number: i64,
    pub slots: [Option<WindowSlot>; WINDOW_LEN],
}

impl RecentOrderWindow {
    pub fn order_ids(&self) -> [Option<OrderId>; WINDOW_LEN] {
        self.slots.map(|slot| slot.map(|slot| slot.order_id))
    }

    /// A missing slot and a first order both read as null here.
    pub fn days(&self) -> [Option<f64>; WINDOW_LEN] {
        self.slots.map(|slot| slot.and_then(|slot| slot.days_since_prior_order))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecencyIndex {
    pub windows: BTreeMap<UserId, RecentOrderWindow>,
}

impl RecencyIndex {
    pub fn get(&self, user: UserId) -> Option<&RecentOrderWindow> {
        self.windows.get(&user)
    }

    pub fn stage_table(&self) -> StageTable<'_> {
        StageTable::new(
            WINDOW_TABLE,
            WINDOW_COLUMNS,
            self.windows.iter().map(|(user, window)| {
                let mut row = Vec::with_capacity(WINDOW_COLUMNS.len());
                row.push(Cell::from(user.0));
                row.push(Cell::from(window.max_order_number));
                row.extend(window.order_ids().iter().map(|id| Cell::from(id.map(|id| id.0))));
                row.extend(window.days().iter().map(|days| Cell::from(*days)));
                row
            }),
        )
    }
}

pub fn index(history: &OrderHistory, orders: &OrderIndex<'_>) -> RecencyIndex {
    let mut max_by_user = BTreeMap::<UserId, i64>::new();
    for order in history.prior_orders() {
        max_by_user
            .entry(order.user_id)
            .and_modify(|max| *max = (*max).max(order.order_number))
            .or_insert(order.order_number);
    }

    let windows = max_by_user
        .into_iter()
        .map(|(user, max_order_number)| {
            let mut slots = [None; WINDOW_LEN];
            for (position, slot) in slots.iter_mut().enumerate() {
                let target = max_order_number - position as i64;
                if target < 1 {
                    continue;
                }
                *slot = orders.by_number(user, target).map(|order| WindowSlot {
                    order_id: order.order_id,
                    days_since_prior_order: order.days_since_prior_order,
                });
            }
            (user, RecentOrderWindow { max_order_number, slots })
        })
        .collect();

    RecencyIndex { windows }
}
