use crate::models::CartItem;

/// Derived view of the cart, split by whether a line needs a prescription
/// confirmation before it can be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub total_count: u64,
    pub total_price: f64,
    pub orderable: Vec<CartItem>,
    pub prescription: Vec<CartItem>,
}

impl CartSummary {
    pub fn orderable_total(&self) -> f64 {
        self.orderable.iter().map(CartItem::line_total).sum()
    }

    pub fn orderable_count(&self) -> u64 {
        self.orderable.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
