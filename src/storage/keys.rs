//! Storage keys. Each one has exactly one owning store.

pub const USER: &str = "user";
pub const TOKEN: &str = "token";
/// Alias of [`TOKEN`], written and cleared together with it.
pub const AUTH_TOKEN: &str = "authToken";
pub const USER_ID: &str = "userId";
pub const USERS: &str = "users";

pub const CART: &str = "cart";
pub const FAVORITES: &str = "favorites";
pub const PROFILE: &str = "profile";
pub const PRODUCTS: &str = "products";

pub const LAST_ORDER: &str = "lastOrder";
pub const SEARCH_HISTORY: &str = "searchHistory";
