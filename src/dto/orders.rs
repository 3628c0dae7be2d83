use serde::Deserialize;

use crate::models::{CartItem, LastOrder};

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutRequest {
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order: LastOrder,
    pub items: Vec<CartItem>,
    /// Lines left in the cart awaiting prescription confirmation.
    pub pending_prescription: Vec<CartItem>,
}
