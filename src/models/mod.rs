use serde::{Deserialize, Serialize};

/// Placeholder author sent with every save. The backend requires the field but
/// nothing models authorship yet.
pub(crate) const DEFAULT_AUTHOR: &str = "string";

/// Body of `POST /notes`. The backend upserts by `identifier`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SaveNoteRequest {
    pub note: String,
    pub author: String,
    pub identifier: String,
}

impl SaveNoteRequest {
    pub fn new(identifier: &str, content: &str) -> Self {
        Self {
            note: content.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            identifier: identifier.to_string(),
        }
    }
}

/// Response of `GET /notes/{identifier}`.
///
/// The backend answers with an empty object (or `note: null`) for identifiers it
/// has never seen, so both fields are optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct NoteResponse {
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

impl NoteResponse {
    pub fn content(self) -> String {
        self.note.unwrap_or_default()
    }
}

/// One row of the admin listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AdminNote {
    pub id: i64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub identifier: String,
}

/// Paginated listing returned by `GET /notes?page=..&per_page=..`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct NoteListPage {
    #[serde(default)]
    pub notes: Vec<AdminNote>,
    #[serde(default)]
    pub total: i64,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
    #[serde(default = "first_page")]
    pub total_pages: i64,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

fn first_page() -> i64 {
    1
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AdminLoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AdminUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Editor front-end for a note. Stored per identifier in localStorage only.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum NoteMode {
    #[default]
    Text,
    Code,
}

/// Page-size choices offered by the admin panel. `-1` asks the backend for all rows.
pub(crate) const PER_PAGE_ALL: i64 = -1;
pub(crate) const PER_PAGE_CHOICES: [i64; 3] = [10, 20, PER_PAGE_ALL];

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_save_note_request_uses_placeholder_author() {
        let req = SaveNoteRequest::new("BraveFalcon", "- milk");
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["note"], "- milk");
        assert_eq!(v["author"], "string");
        assert_eq!(v["identifier"], "BraveFalcon");
    }

    #[test]
    fn test_note_response_missing_note_is_empty() {
        let parsed: NoteResponse = serde_json::from_str("{}").expect("should parse");
        assert_eq!(parsed.content(), "");

        let parsed: NoteResponse =
            serde_json::from_str(r#"{"note": null}"#).expect("should parse");
        assert_eq!(parsed.content(), "");
    }

    #[test]
    fn test_note_response_contract_deserialize() {
        let json = r#"{"id": 7, "note": "hello", "author": "string", "identifier": "abc"}"#;
        let parsed: NoteResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.identifier.as_deref(), Some("abc"));
        assert_eq!(parsed.content(), "hello");
    }

    #[test]
    fn test_note_list_page_contract_deserialize() {
        let json = r#"{
            "notes": [
                {"id": 1, "note": "a", "author": "string", "identifier": "one"},
                {"id": 2, "note": "b", "author": "string", "identifier": "two"}
            ],
            "total": 12,
            "page": 2,
            "per_page": 10,
            "total_pages": 2,
            "has_next": false,
            "has_prev": true
        }"#;
        let parsed: NoteListPage = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.notes.len(), 2);
        assert_eq!(parsed.notes[1].identifier, "two");
        assert_eq!(parsed.total, 12);
        assert!(parsed.has_prev);
        assert!(!parsed.has_next);
    }

    #[test]
    fn test_note_list_page_defaults_when_fields_missing() {
        let parsed: NoteListPage = serde_json::from_str(r#"{"notes": []}"#).expect("should parse");
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.total_pages, 1);
        assert_eq!(parsed.total, 0);
    }

    #[test]
    fn test_admin_login_response_contract_deserialize() {
        let json = r#"{"access_token": "jwt", "token_type": "bearer"}"#;
        let parsed: AdminLoginResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.access_token, "jwt");
        assert_eq!(parsed.token_type.as_deref(), Some("bearer"));
    }

    #[test]
    fn test_note_mode_string_forms() {
        assert_eq!(NoteMode::Text.to_string(), "text");
        assert_eq!(NoteMode::Code.as_ref(), "code");
        assert_eq!(NoteMode::from_str("code").ok(), Some(NoteMode::Code));
        assert!(NoteMode::from_str("markdown").is_err());
        assert_eq!(
            serde_json::to_value(NoteMode::Code).expect("should serialize"),
            "code"
        );
    }
}
