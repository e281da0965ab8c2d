use crate::models::NoteMode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use wasm_bindgen::JsCast;

pub(crate) const ADMIN_TOKEN_COOKIE: &str = "adminToken";
pub(crate) const ADMIN_TOKEN_MAX_AGE_SECS: u32 = 86_400;

fn mode_key(identifier: &str) -> String {
    format!("tlee_mode::{identifier}")
}

/// Finds `name` in a `document.cookie` string (`a=1; b=2`).
pub(crate) fn find_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == name).then(|| v.to_string())
        })
        .filter(|v| !v.is_empty())
}

pub(crate) fn admin_token_cookie(token: &str) -> String {
    format!(
        "{ADMIN_TOKEN_COOKIE}={token}; path=/; max-age={ADMIN_TOKEN_MAX_AGE_SECS}; secure; samesite=strict"
    )
}

pub(crate) fn expired_admin_token_cookie() -> String {
    format!("{ADMIN_TOKEN_COOKIE}=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT")
}

fn html_document() -> Option<web_sys::HtmlDocument> {
    web_sys::window()?
        .document()?
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()
}

pub(crate) fn load_admin_token() -> Option<String> {
    let cookies = html_document()?.cookie().ok()?;
    find_cookie(&cookies, ADMIN_TOKEN_COOKIE)
}

pub(crate) fn save_admin_token(token: &str) {
    if let Some(doc) = html_document() {
        let _ = doc.set_cookie(&admin_token_cookie(token));
    }
}

pub(crate) fn clear_admin_token() {
    if let Some(doc) = html_document() {
        let _ = doc.set_cookie(&expired_admin_token_cookie());
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_note_mode(identifier: &str) -> NoteMode {
    if identifier.trim().is_empty() {
        return NoteMode::default();
    }
    load_json_from_storage::<String>(&mode_key(identifier))
        .and_then(|raw| NoteMode::from_str(&raw).ok())
        .unwrap_or_default()
}

pub(crate) fn save_note_mode(identifier: &str, mode: NoteMode) {
    if identifier.trim().is_empty() {
        return;
    }
    save_json_to_storage(&mode_key(identifier), &mode.to_string());
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_note_mode_storage_roundtrip() {
        save_note_mode("wasm-test-note", NoteMode::Code);
        assert_eq!(load_note_mode("wasm-test-note"), NoteMode::Code);

        save_note_mode("wasm-test-note", NoteMode::Text);
        assert_eq!(load_note_mode("wasm-test-note"), NoteMode::Text);

        assert_eq!(load_note_mode("never-saved-note"), NoteMode::Text);
    }

    #[wasm_bindgen_test]
    fn test_clear_admin_token_removes_cookie() {
        clear_admin_token();
        assert!(load_admin_token().is_none());
    }
}
