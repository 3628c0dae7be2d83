use crate::{
    audit::log_audit,
    codec::encode,
    dto::orders::{CheckoutRequest, CheckoutReceipt},
    error::{AppError, AppResult},
    models::{Id, LastOrder},
    state::AppState,
    storage::keys,
    validation::normalize_phone,
};

/// Orders the cart lines that need no prescription. Prescription lines
/// stay in the cart for confirmation.
pub fn checkout(state: &mut AppState, payload: CheckoutRequest) -> AppResult<CheckoutReceipt> {
    let address = payload.address.trim();
    if address.is_empty() {
        return Err(AppError::BadRequest("address is required".into()));
    }
    let phone = normalize_phone(&payload.phone).map_err(AppError::BadRequest)?;

    let summary = state.cart.summary();
    if summary.orderable.is_empty() {
        let reason = if summary.prescription.is_empty() {
            "Cart is empty"
        } else {
            "Cart only has items awaiting prescription confirmation"
        };
        return Err(AppError::BadRequest(reason.into()));
    }

    let order = LastOrder {
        total: summary.orderable_total(),
        date: state.clock.now(),
        items_count: summary.orderable_count().try_into().unwrap_or(u32::MAX),
        address: address.to_string(),
        phone,
    };
    encode(&state.storage, keys::LAST_ORDER, &order)?;

    let ordered: Vec<Id> = summary
        .orderable
        .iter()
        .map(|item| item.product.id.clone())
        .collect();
    state.cart.remove_items(&ordered)?;
    state.profile.increment_orders_count()?;

    let user_id = state.auth.current_session().map(|s| s.user.id.clone());
    log_audit(
        user_id.as_ref(),
        "checkout",
        Some(keys::LAST_ORDER),
        Some(serde_json::json!({ "total": order.total, "items": order.items_count })),
    );

    Ok(CheckoutReceipt {
        order,
        items: summary.orderable,
        pending_prescription: summary.prescription,
    })
}
