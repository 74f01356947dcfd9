use sea_orm::sea_query::Order;

use crate::filtering::sort::{OrderBy, SortDirection};

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

impl OrderBy {
    /// `(column, order)` pairs in declaration order, ready for `order_by`.
    #[must_use]
    pub fn to_orders(&self) -> Vec<(String, Order)> {
        self.iter()
            .map(|(field, direction)| (field.clone(), Order::from(*direction)))
            .collect()
    }
}
