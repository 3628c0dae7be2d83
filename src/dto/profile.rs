use chrono::NaiveDate;

use crate::models::{AvatarFile, Gender};

/// Fields to overwrite on the profile; `None` keeps the current value.
/// `birth_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub avatar_file: Option<AvatarFile>,
    pub bonuses: Option<i64>,
    pub favorites_count: Option<i64>,
    pub orders_count: Option<i64>,
}
