use wasm_bindgen::JsCast;

pub(crate) const ADJECTIVES: &[&str] = &[
    "Brave", "Swift", "Silent", "Mighty", "Clever", "Fierce", "Nimble", "Bold", "Radiant",
    "Stormy", "Lucky", "Cosmic", "Iron", "Golden", "Shadow", "Crimson", "Frosty", "Wild",
    "Noble", "Electric",
];

pub(crate) const HERONAMES: &[&str] = &[
    "Falcon", "Phoenix", "Titan", "Ranger", "Sentinel", "Valkyrie", "Comet", "Wizard",
    "Panther", "Guardian", "Spectre", "Nomad", "Hornet", "Vortex", "Paladin", "Raven", "Cyclone",
    "Warden", "Tempest", "Samurai",
];

fn random_u32() -> u32 {
    let mut buf = [0u8; 4];
    if getrandom::getrandom(&mut buf).is_err() {
        // No CSPRNG available; fall back to the clock.
        return js_sys::Date::now() as u32;
    }
    u32::from_le_bytes(buf)
}

/// Builds an identifier from two random indices, e.g. `BraveFalcon`.
pub(crate) fn hero_name_from(adj_roll: u32, hero_roll: u32) -> String {
    let adj = ADJECTIVES[adj_roll as usize % ADJECTIVES.len()];
    let hero = HERONAMES[hero_roll as usize % HERONAMES.len()];
    format!("{adj}{hero}")
}

pub(crate) fn generate_random_hero_name() -> String {
    hero_name_from(random_u32(), random_u32())
}

/// Normalizes a user-typed identifier for navigation. Empty input yields `None`.
pub(crate) fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn note_href(identifier: &str) -> String {
    format!("/{}", urlencoding::encode(identifier))
}

pub(crate) fn share_url(origin: &str, identifier: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), note_href(identifier))
}

/// Shortens `text` to `max_chars` characters, appending `...` when cut.
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn clipboard_write_text(text: &str) -> Result<js_sys::Promise, wasm_bindgen::JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let clipboard = js_sys::Reflect::get(&window.navigator(), &"clipboard".into())?;
    let write_text = js_sys::Reflect::get(&clipboard, &"writeText".into())?
        .dyn_into::<js_sys::Function>()?;
    write_text
        .call1(&clipboard, &text.into())?
        .dyn_into::<js_sys::Promise>()
}

/// Writes `text` to the system clipboard; failures are only logged.
pub(crate) fn copy_to_clipboard(text: &str) {
    let promise = match clipboard_write_text(text) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = ?e, "clipboard unavailable");
            return;
        }
    };
    leptos::task::spawn_local(async move {
        if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
            tracing::error!(error = ?e, "failed to copy to clipboard");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_name_is_adjective_plus_hero() {
        assert_eq!(hero_name_from(0, 0), "BraveFalcon");
        assert_eq!(hero_name_from(1, 2), "SwiftTitan");
    }

    #[test]
    fn test_hero_name_wraps_rolls() {
        let adj_len = ADJECTIVES.len() as u32;
        let hero_len = HERONAMES.len() as u32;
        assert_eq!(hero_name_from(adj_len, hero_len), hero_name_from(0, 0));
        assert_eq!(hero_name_from(adj_len + 1, 1), "SwiftPhoenix");
    }

    #[test]
    fn test_every_generated_name_comes_from_word_lists() {
        for a in 0..ADJECTIVES.len() as u32 {
            for h in 0..HERONAMES.len() as u32 {
                let name = hero_name_from(a, h);
                let adj = ADJECTIVES
                    .iter()
                    .find(|w| name.starts_with(*w))
                    .expect("name should start with an adjective");
                assert!(HERONAMES.contains(&&name[adj.len()..]));
            }
        }
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  shopping "), Some("shopping".to_string()));
        assert_eq!(normalize_identifier("/shopping/"), Some("shopping".to_string()));
        assert_eq!(normalize_identifier("   "), None);
        assert_eq!(normalize_identifier("//"), None);
    }

    #[test]
    fn test_note_href_and_share_url() {
        assert_eq!(note_href("BraveFalcon"), "/BraveFalcon");
        assert_eq!(note_href("my note"), "/my%20note");
        assert_eq!(
            share_url("https://tlee.app/", "BraveFalcon"),
            "https://tlee.app/BraveFalcon"
        );
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 100), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("abc", 3), "abc");
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_text("", 3), "");
    }
}
