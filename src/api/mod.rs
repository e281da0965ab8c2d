use crate::config::EnvConfig;
use crate::models::{AdminLoginResponse, AdminUser, NoteListPage, NoteResponse, SaveNoteRequest};
use crate::storage::{clear_admin_token, load_admin_token};
use serde::de::DeserializeOwned;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    /// 404 from the backend.
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// Server-provided `detail`, when the body carried one.
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    fn network(e: reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Network, e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorKind::Parse, e.to_string())
    }

    fn unauthorized(detail: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: detail.clone().unwrap_or_else(|| "Unauthorized".to_string()),
            detail,
        }
    }

    fn http(status: reqwest::StatusCode, body: &str, ctx: &str) -> Self {
        let detail = error_detail(body);
        let shown = detail.clone().unwrap_or_else(|| body.to_string());
        let kind = if status == reqwest::StatusCode::NOT_FOUND {
            ApiErrorKind::NotFound
        } else {
            ApiErrorKind::Http
        };
        Self {
            kind,
            message: format!("{ctx} ({status}): {shown}"),
            detail,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// A note the backend has never stored reads as empty.
fn empty_when_missing(e: ApiError) -> ApiResult<String> {
    if e.kind == ApiErrorKind::NotFound {
        Ok(String::new())
    } else {
        Err(e)
    }
}

/// Pulls the human-readable message out of an error body.
///
/// The backend answers `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "..."}, ..]}` for validation failures.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    match v.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .collect::<Vec<_>>();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

/// Query for the admin listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NoteListQuery {
    pub page: i64,
    pub per_page: i64,
    pub search: Option<String>,
}

impl NoteListQuery {
    pub fn new(page: i64, per_page: i64, search: &str) -> Self {
        let search = search.trim();
        Self {
            page: page.max(1),
            per_page,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Base URL from `window.ENV`, admin token from the `adminToken` cookie.
    pub fn load_from_storage() -> Self {
        let mut client = Self::new(EnvConfig::new().api_url);
        client.token = load_admin_token();
        client
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    pub fn logout(&mut self) {
        self.token = None;
        clear_admin_token();
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn note_path(identifier: &str) -> String {
        format!("/notes/{}", urlencoding::encode(identifier))
    }

    pub(crate) fn delete_by_identifier_path(identifier: &str) -> String {
        format!("/admin/notes/delete/{}", urlencoding::encode(identifier))
    }

    pub(crate) fn delete_by_id_path(id: i64) -> String {
        format!("/admin/notes/{id}")
    }

    fn with_auth_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.get_auth_header() {
            Some(value) => req.header("Authorization", value),
            None => req,
        }
    }

    async fn send(req: reqwest::RequestBuilder, ctx: &str) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if status.as_u16() == 401 {
            Err(ApiError::unauthorized(error_detail(&body)))
        } else {
            Err(ApiError::http(status, &body, ctx))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        req: reqwest::RequestBuilder,
        ctx: &str,
    ) -> ApiResult<T> {
        let res = Self::send(req, ctx).await?;
        let text = res.text().await.map_err(ApiError::network)?;
        serde_json::from_str(&text).map_err(ApiError::parse)
    }

    pub async fn get_note(&self, identifier: &str) -> ApiResult<String> {
        let req = reqwest::Client::new().get(self.url(&Self::note_path(identifier)));
        match Self::send_json::<NoteResponse>(req, "Failed to fetch note").await {
            Ok(data) => Ok(data.content()),
            Err(e) => empty_when_missing(e),
        }
    }

    pub async fn save_note(&self, identifier: &str, content: &str) -> ApiResult<()> {
        let req = reqwest::Client::new()
            .post(self.url("/notes"))
            .json(&SaveNoteRequest::new(identifier, content));
        Self::send(req, "Failed to save note").await?;
        Ok(())
    }

    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> ApiResult<AdminLoginResponse> {
        let req = reqwest::Client::new()
            .post(self.url("/admin/login"))
            .form(&[("username", username), ("password", password)]);
        Self::send_json(req, "Login failed").await
    }

    pub async fn admin_me(&self) -> ApiResult<AdminUser> {
        let req = self.with_auth_headers(reqwest::Client::new().get(self.url("/admin/me")));
        Self::send_json(req, "Failed to load admin profile").await
    }

    pub async fn list_notes(&self, query: &NoteListQuery) -> ApiResult<NoteListPage> {
        let req = self.with_auth_headers(
            reqwest::Client::new()
                .get(self.url("/notes"))
                .query(&query.to_pairs()),
        );
        Self::send_json(req, "Failed to fetch notes").await
    }

    /// Routes `delete_note` tries, in order. A blank identifier goes straight
    /// to the numeric-id route.
    pub(crate) fn delete_paths(id: i64, identifier: &str) -> Vec<String> {
        let mut paths = Vec::with_capacity(2);
        if !identifier.trim().is_empty() {
            paths.push(Self::delete_by_identifier_path(identifier));
        }
        paths.push(Self::delete_by_id_path(id));
        paths
    }

    /// Deletes by identifier, falling back to the numeric-id route when the
    /// identifier route is missing or refuses.
    pub async fn delete_note(&self, id: i64, identifier: &str) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let mut last_err = None;

        for path in Self::delete_paths(id, identifier) {
            let req = self.with_auth_headers(client.delete(self.url(&path)));
            match Self::send(req, "Failed to delete note").await {
                Ok(_) => return Ok(()),
                Err(e) if e.kind == ApiErrorKind::Network => return Err(e),
                Err(e) => {
                    tracing::debug!(id, identifier, %path, error = %e, "delete route refused");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ApiError::new(ApiErrorKind::Http, "Failed to delete note")))
    }
}
