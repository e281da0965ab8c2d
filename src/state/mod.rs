mod autosave;

pub(crate) use autosave::{AutosaveController, SyncStatus};

use crate::api::ApiClient;
use crate::models::AdminUser;
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Filled by `/admin/me` once the panel has verified the token.
    pub admin_user: RwSignal<Option<AdminUser>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::load_from_storage()),
            admin_user: RwSignal::new(None),
        }
    }

    /// Drops the admin session: token, cookie and cached profile.
    pub fn sign_out(&self) {
        self.api_client.update(|c| c.logout());
        self.admin_user.set(None);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
