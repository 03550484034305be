use serde::{Deserialize, Serialize};

use crate::domain::order::{ItemId, UserId};
use crate::errors::DomainError;

/// One (user, item) pair. Ordering is user first, then item, which is also
/// the lexicographic order of the rendered key under a valid [`PairKeyFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub user: UserId,
    pub item: ItemId,
}

impl PairKey {
    pub fn new(user: UserId, item: ItemId) -> Self {
        Self { user, item }
    }
}

/// Zero-padded field widths for the `up_pair` text key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairKeyFormat {
    pub user_width: usize,
    pub item_width: usize,
}

impl Default for PairKeyFormat {
    fn default() -> Self {
        Self { user_width: 6, item_width: 6 }
    }
}

impl PairKeyFormat {
    pub fn new(user_width: usize, item_width: usize) -> Self {
        Self { user_width, item_width }
    }

    /// Fails instead of truncating so two pairs can never share a key.
    pub fn check(&self, pair: PairKey) -> Result<(), DomainError> {
        fits("user_id", pair.user.0, self.user_width)?;
        fits("product_id", pair.item.0, self.item_width)
    }

    pub fn render(&self, pair: PairKey) -> Result<String, DomainError> {
        self.check(pair)?;
        Ok(self.render_unchecked(pair))
    }

    /// Callers must have passed `pair` through [`PairKeyFormat::check`].
    pub fn render_unchecked(&self, pair: PairKey) -> String {
        format!(
            "{:0uw$}-{:0iw$}",
            pair.user.0,
            pair.item.0,
            uw = self.user_width,
            iw = self.item_width
        )
    }
}

fn fits(field: &'static str, id: i64, width: usize) -> Result<(), DomainError> {
    let digits = id.checked_abs().map(|value| value.to_string().len());
    match digits {
        Some(digits) if id >= 0 && digits <= width => Ok(()),
        _ => Err(DomainError::PairKeyOverflow { field, id, width }),
    }
}
