use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which slice of the dataset an order belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalSet {
    Prior,
    Train,
    Test,
}

impl EvalSet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prior => "prior",
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl std::str::FromStr for EvalSet {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "prior" => Ok(Self::Prior),
            "train" => Ok(Self::Train),
            "test" => Ok(Self::Test),
            other => Err(DomainError::InvalidEvalSet(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub eval_set: EvalSet,
    /// 1-based, increasing with time per user.
    pub order_number: i64,
    /// Null for a user's first order.
    pub days_since_prior_order: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub item_id: ItemId,
}

impl OrderItem {
    pub fn new(order_id: i64, item_id: i64) -> Self {
        Self { order_id: OrderId(order_id), item_id: ItemId(item_id) }
    }
}

#[cfg(test)]
mod tests {
    use super::EvalSet;
    use crate::errors::DomainError;

    #[test]
    fn eval_set_parses_known_tags() {
        assert_eq!("prior".parse::<EvalSet>().expect("prior"), EvalSet::Prior);
        assert_eq!(" train ".parse::<EvalSet>().expect("train"), EvalSet::Train);
        assert_eq!("test".parse::<EvalSet>().expect("test"), EvalSet::Test);
    }

    #[test]
    fn eval_set_rejects_unknown_tag() {
        let error = "holdout".parse::<EvalSet>().expect_err("holdout is not a tag");
        assert!(matches!(error, DomainError::InvalidEvalSet(ref tag) if tag == "holdout"));
    }
}
