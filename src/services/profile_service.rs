use crate::{
    codec::{decode, encode},
    dto::profile::ProfilePatch,
    error::AppResult,
    models::Profile,
    storage::{Storage, keys},
};

/// `None` means the user never saved a profile, not an empty one.
#[derive(Debug)]
pub struct ProfileStore {
    storage: Storage,
    profile: Option<Profile>,
}

impl ProfileStore {
    pub fn load(storage: Storage) -> Self {
        let profile = decode(&storage, keys::PROFILE, None);
        Self { storage, profile }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    /// Merges `patch` onto the current profile, or onto a zeroed one if
    /// none exists yet.
    pub fn set_full_profile(&mut self, patch: ProfilePatch) -> AppResult<Profile> {
        let mut next = self.profile.clone().unwrap_or_default();
        apply_patch(&mut next, patch);
        let created = self.profile.is_none();
        self.commit(next.clone())?;
        tracing::debug!(created, "profile saved");
        Ok(next)
    }

    /// No-op while no profile exists.
    pub fn set_favorites_count(&mut self, count: i64) -> AppResult<()> {
        self.update_existing(|profile| profile.favorites_count = count)
    }

    pub fn increment_orders_count(&mut self) -> AppResult<()> {
        self.update_existing(|profile| profile.orders_count += 1)
    }

    pub fn logout(&mut self) -> AppResult<()> {
        self.storage.remove(keys::PROFILE)?;
        self.profile = None;
        tracing::debug!("profile cleared");
        Ok(())
    }

    /// Re-reads the stored profile. The avatar is session-only, so the one
    /// held in memory survives the reload.
    pub fn reload(&mut self) {
        let avatar = self.profile.as_mut().and_then(|p| p.avatar_file.take());
        self.profile = decode(&self.storage, keys::PROFILE, None);
        if let Some(profile) = self.profile.as_mut() {
            profile.avatar_file = avatar;
        }
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.logout()
    }

    fn update_existing(&mut self, f: impl FnOnce(&mut Profile)) -> AppResult<()> {
        let Some(mut next) = self.profile.clone() else {
            tracing::debug!("no profile, counter update skipped");
            return Ok(());
        };
        f(&mut next);
        self.commit(next)
    }

    fn commit(&mut self, next: Profile) -> AppResult<()> {
        encode(&self.storage, keys::PROFILE, &next)?;
        self.profile = Some(next);
        Ok(())
    }
}

fn apply_patch(profile: &mut Profile, patch: ProfilePatch) {
    let ProfilePatch {
        name,
        city,
        phone,
        gender,
        birth_date,
        avatar_file,
        bonuses,
        favorites_count,
        orders_count,
    } = patch;

    if let Some(name) = name {
        profile.name = name;
    }
    if let Some(city) = city {
        profile.city = city;
    }
    if let Some(phone) = phone {
        profile.phone = phone;
    }
    if let Some(gender) = gender {
        profile.gender = gender;
    }
    if let Some(birth_date) = birth_date {
        profile.birth_date = birth_date;
    }
    if let Some(avatar_file) = avatar_file {
        profile.avatar_file = Some(avatar_file);
    }
    if let Some(bonuses) = bonuses {
        profile.bonuses = bonuses;
    }
    if let Some(favorites_count) = favorites_count {
        profile.favorites_count = favorites_count;
    }
    if let Some(orders_count) = orders_count {
        profile.orders_count = orders_count;
    }
}
