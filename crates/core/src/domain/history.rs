use std::collections::HashMap;

use crate::domain::order::{EvalSet, Order, OrderId, OrderItem, UserId};

/// Everything a pipeline run reads from the store, loaded once per run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub prior_items: Vec<OrderItem>,
    pub train_items: Vec<OrderItem>,
}

impl OrderHistory {
    pub fn new(orders: Vec<Order>, prior_items: Vec<OrderItem>, train_items: Vec<OrderItem>) -> Self {
        Self { orders, prior_items, train_items }
    }

    pub fn prior_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|order| order.eval_set == EvalSet::Prior)
    }
}

/// Lookup tables over `orders`, standing in for the join keys a relational
/// engine would use.
#[derive(Debug, Default)]
pub struct OrderIndex<'a> {
    by_id: HashMap<OrderId, &'a Order>,
    by_user_number: HashMap<(UserId, i64), &'a Order>,
}

impl<'a> OrderIndex<'a> {
    /// On duplicate keys the first row wins.
    pub fn build(orders: &'a [Order]) -> Self {
        let mut by_id = HashMap::with_capacity(orders.len());
        let mut by_user_number = HashMap::with_capacity(orders.len());

        for order in orders {
            by_id.entry(order.order_id).or_insert(order);
            by_user_number.entry((order.user_id, order.order_number)).or_insert(order);
        }

        Self { by_id, by_user_number }
    }

    pub fn get(&self, order_id: OrderId) -> Option<&'a Order> {
        self.by_id.get(&order_id).copied()
    }

    pub fn by_number(&self, user_id: UserId, order_number: i64) -> Option<&'a Order> {
        self.by_user_number.get(&(user_id, order_number)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderHistory, OrderIndex};
    use crate::domain::order::{EvalSet, Order, OrderId, UserId};

    fn order(order_id: i64, user_id: i64, eval_set: EvalSet, order_number: i64) -> Order {
        Order {
            order_id: OrderId(order_id),
            user_id: UserId(user_id),
            eval_set,
            order_number,
            days_since_prior_order: None,
        }
    }

    #[test]
    fn index_resolves_by_id_and_by_user_number() {
        let orders = vec![
            order(10, 1, EvalSet::Prior, 1),
            order(11, 1, EvalSet::Prior, 2),
            order(12, 1, EvalSet::Train, 3),
        ];
        let index = OrderIndex::build(&orders);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get(OrderId(11)).map(|o| o.order_number), Some(2));
        assert_eq!(index.by_number(UserId(1), 3).map(|o| o.order_id), Some(OrderId(12)));
        assert!(index.by_number(UserId(2), 1).is_none());
    }

    #[test]
    fn first_duplicate_order_id_wins() {
        let orders = vec![order(10, 1, EvalSet::Prior, 1), order(10, 2, EvalSet::Prior, 1)];
        let index = OrderIndex::build(&orders);

        assert_eq!(index.get(OrderId(10)).map(|o| o.user_id), Some(UserId(1)));
    }

    #[test]
    fn prior_orders_skips_train_and_test() {
        let history = OrderHistory::new(
            vec![
                order(1, 1, EvalSet::Prior, 1),
                order(2, 1, EvalSet::Train, 2),
                order(3, 2, EvalSet::Test, 1),
            ],
            Vec::new(),
            Vec::new(),
        );

        assert_eq!(history.prior_orders().count(), 1);
    }
}
