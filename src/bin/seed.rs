use std::path::PathBuf;

use qure_storefront::{
    config::AppConfig,
    dto::{
        auth::{LoginRequest, RegisterRequest},
        products::CreateProductRequest,
    },
    error::AppError,
    state::AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,qure_storefront=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::from_env()?;
    if config.storage_path.is_none() {
        config.storage_path = Some(PathBuf::from("qure-storage.json"));
    }
    let mut state = AppState::open(config)?;

    ensure_user(&mut state, "Тестовый пользователь", "user@qure.kz", "user123")?;

    let superuser = LoginRequest {
        email: state.config.auth.superuser_email.clone(),
        password: state.config.auth.superuser_password.clone(),
    };
    let admin = state.auth.login(superuser)?;
    seed_products(&mut state, &admin)?;
    state.auth.logout()?;

    println!(
        "Seed completed. Users: {}, products: {}",
        state.auth.registered_users().len(),
        state.admin.products().len()
    );
    Ok(())
}

fn ensure_user(state: &mut AppState, name: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let request = RegisterRequest {
        name: name.into(),
        email: email.into(),
        password: password.into(),
    };
    match state.auth.register(request) {
        Ok(user) => println!("Registered {email} (id={})", user.id),
        Err(AppError::EmailTaken) => println!("User {email} already exists"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn seed_products(
    state: &mut AppState,
    admin: &qure_storefront::models::Session,
) -> anyhow::Result<()> {
    let products = [
        ("Нурофен", "Таблетки 200 мг, 20 шт", 1450.0, false, "pain", "nsaid"),
        ("Амоксициллин", "Капсулы 500 мг, 16 шт", 2100.0, true, "antibiotics", "penicillins"),
        ("Витамин D3", "Капли 10 мл", 3200.0, false, "vitamins", "vitamin-d"),
        ("Називин", "Спрей назальный 0,05%", 1890.0, false, "cold", "nasal"),
    ];

    for (title, subtitle, price, rx, category, sub) in products {
        if state.admin.products().iter().any(|p| p.title == title) {
            continue;
        }
        state.admin.create_product(
            Some(admin),
            CreateProductRequest {
                title: title.into(),
                subtitle: subtitle.into(),
                price,
                old_price: None,
                image: None,
                in_stock: Some(true),
                prescription_required: rx,
                discount_percent: None,
                category_slug: Some(category.into()),
                sub_slug: Some(sub.into()),
                description: String::new(),
            },
        )?;
    }

    println!("Seeded products");
    Ok(())
}
