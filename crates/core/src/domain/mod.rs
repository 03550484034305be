pub mod history;
pub mod order;
pub mod pair;
pub mod row;
