use std::sync::Arc;

use qure_storefront::{
    error::AppError,
    models::{Id, Product},
    services::cart_service::CartStore,
    storage::{MemoryStorage, Storage, StorageError, keys},
};

fn product(id: &str, price: f64) -> Product {
    Product {
        id: Id::from(id),
        title: format!("Product {id}"),
        subtitle: String::new(),
        price,
        old_price: None,
        image: String::new(),
        in_stock: Some(true),
        prescription_required: false,
        discount_percent: None,
        category_slug: None,
        sub_slug: None,
        popularity: 0.0,
        description: String::new(),
    }
}

#[test]
fn full_cart_lifecycle() -> anyhow::Result<()> {
    let mut cart = CartStore::load(Storage::in_memory());
    let p1 = product("p1", 1000.0);

    cart.add_to_cart(&p1, 2)?;
    assert_eq!(cart.total_price(), 2000.0);
    assert_eq!(cart.total_count(), 2);

    let item = cart.change_quantity(&Id::from("p1"), 1)?.expect("item present");
    assert_eq!(item.quantity, 3);
    assert_eq!(cart.total_price(), 3000.0);

    cart.remove_item(&Id::from("p1"))?;
    assert!(cart.is_empty());
    assert_eq!(cart.total_price(), 0.0);
    Ok(())
}

#[test]
fn adding_same_product_accumulates_quantity() -> anyhow::Result<()> {
    let mut cart = CartStore::load(Storage::in_memory());
    let p = product("p1", 500.0);

    cart.add_to_cart(&p, 2)?;
    cart.add_to_cart(&p, 3)?;

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 5);
    Ok(())
}

#[test]
fn decrement_never_goes_below_one() -> anyhow::Result<()> {
    let mut cart = CartStore::load(Storage::in_memory());
    cart.add_to_cart(&product("p1", 100.0), 3)?;

    let mut seen = Vec::new();
    for _ in 0..5 {
        let item = cart.change_quantity(&Id::from("p1"), -1)?.expect("item stays");
        seen.push(item.quantity);
    }
    assert_eq!(seen, vec![2, 1, 1, 1, 1]);

    let item = cart.change_quantity(&Id::from("p1"), -100)?;
    assert_eq!(item.map(|i| i.quantity), Some(1));
    assert_eq!(cart.total_count(), 1);
    Ok(())
}

#[test]
fn extreme_deltas_saturate_at_quantity_bounds() -> anyhow::Result<()> {
    let mut cart = CartStore::load(Storage::in_memory());
    cart.add_to_cart(&product("p1", 1.0), 2)?;

    let item = cart.change_quantity(&Id::from("p1"), i64::MAX)?;
    assert_eq!(item.map(|i| i.quantity), Some(u32::MAX));

    let item = cart.change_quantity(&Id::from("p1"), i64::MIN)?;
    assert_eq!(item.map(|i| i.quantity), Some(1));
    assert_eq!(cart.total_count(), 1);
    Ok(())
}

#[test]
fn change_quantity_on_unknown_id_is_noop() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut cart = CartStore::load(storage.clone());

    assert_eq!(cart.change_quantity(&Id::from("missing"), 1)?, None);
    assert!(storage.get(keys::CART)?.is_none());
    Ok(())
}

#[test]
fn removing_twice_is_idempotent() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut cart = CartStore::load(storage.clone());
    cart.add_to_cart(&product("p1", 10.0), 1)?;
    cart.add_to_cart(&product("p2", 20.0), 1)?;

    cart.remove_item(&Id::from("p1"))?;
    let after_first = (cart.items().to_vec(), storage.get(keys::CART)?);

    cart.remove_item(&Id::from("p1"))?;
    let after_second = (cart.items().to_vec(), storage.get(keys::CART)?);

    assert_eq!(after_first, after_second);
    assert_eq!(cart.items().len(), 1);
    Ok(())
}

#[test]
fn zero_quantity_is_rejected() {
    let mut cart = CartStore::load(Storage::in_memory());
    let err = cart.add_to_cart(&product("p1", 10.0), 0).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(cart.is_empty());
}

#[test]
fn every_mutation_is_written_through() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut cart = CartStore::load(storage.clone());
    cart.add_to_cart(&product("p1", 250.0), 2)?;
    cart.change_quantity(&Id::from("p1"), 2)?;

    let reopened = CartStore::load(storage.clone());
    assert_eq!(reopened.items(), cart.items());
    assert_eq!(reopened.items()[0].quantity, 4);
    Ok(())
}

#[test]
fn malformed_stored_cart_loads_empty() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    storage.set(keys::CART, "{not json")?;

    let cart = CartStore::load(storage);
    assert!(cart.is_empty());
    Ok(())
}

#[test]
fn stored_duplicates_and_zero_quantities_are_repaired() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    storage.set(
        keys::CART,
        r#"[
            {"id":"p1","title":"A","price":100,"quantity":1},
            {"id":"p1","title":"A","price":100,"quantity":2},
            {"id":7,"title":"B","price":50,"quantity":0},
            {"id":"p3","title":"C","price":10}
        ]"#,
    )?;

    let cart = CartStore::load(storage);
    assert_eq!(cart.items().len(), 3);
    assert_eq!(cart.get(&Id::from("p1")).map(|i| i.quantity), Some(3));
    assert_eq!(cart.get(&Id::Num(7)).map(|i| i.quantity), Some(1));
    assert_eq!(cart.get(&Id::from("p3")).map(|i| i.quantity), Some(1));
    Ok(())
}

#[test]
fn failed_write_leaves_cart_unchanged() {
    let storage = Storage::new(Arc::new(MemoryStorage::with_quota(32)));
    let mut cart = CartStore::load(storage.clone());

    let err = cart.add_to_cart(&product("p1", 10.0), 1).unwrap_err();
    assert!(matches!(
        err,
        AppError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert!(!err.is_user_facing());
    assert!(cart.is_empty());
    assert!(storage.get(keys::CART).unwrap().is_none());
}

#[test]
fn summary_separates_prescription_items() -> anyhow::Result<()> {
    let mut cart = CartStore::load(Storage::in_memory());
    let mut rx = product("rx", 3000.0);
    rx.prescription_required = true;

    cart.add_to_cart(&product("otc", 1000.0), 2)?;
    cart.add_to_cart(&rx, 1)?;

    let summary = cart.summary();
    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.total_price, 5000.0);
    assert_eq!(summary.orderable.len(), 1);
    assert_eq!(summary.prescription.len(), 1);
    assert_eq!(summary.orderable_total(), 2000.0);
    assert_eq!(summary.orderable_count(), 2);
    Ok(())
}
