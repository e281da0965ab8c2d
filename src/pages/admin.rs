use crate::api::{ApiError, ApiErrorKind, NoteListQuery};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::models::{AdminNote, NoteListPage, PER_PAGE_ALL, PER_PAGE_CHOICES};
use crate::state::AppContext;
use crate::storage::{load_admin_token, save_admin_token};
use crate::util::{copy_to_clipboard, note_href, share_url, truncate_text};
use icons::{Copy as CopyIcon, LogOut, RefreshCw, Search, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;
use wasm_bindgen::JsCast;

const PREVIEW_CHARS: usize = 100;
const TOAST_MS: i32 = 3000;
const DEFAULT_PER_PAGE: i64 = 10;
/// Page buttons shown on each side of the current page.
const PAGE_WINDOW: i64 = 2;

pub(crate) fn login_error_message(e: &ApiError) -> String {
    match e.kind {
        ApiErrorKind::Network => "Network error. Please try again.".to_string(),
        ApiErrorKind::Unauthorized | ApiErrorKind::NotFound | ApiErrorKind::Http => e
            .detail
            .clone()
            .unwrap_or_else(|| "Login failed".to_string()),
        ApiErrorKind::Parse => "Login failed".to_string(),
    }
}

pub(crate) fn can_submit_login(username: &str, password: &str, loading: bool) -> bool {
    !loading && !username.is_empty() && !password.is_empty()
}

pub(crate) fn per_page_label(per_page: i64) -> String {
    if per_page == PER_PAGE_ALL {
        "All".to_string()
    } else {
        per_page.to_string()
    }
}

/// Value from the page-size `<select>`; anything unexpected falls back to 10.
pub(crate) fn parse_per_page(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| PER_PAGE_CHOICES.contains(v))
        .unwrap_or(DEFAULT_PER_PAGE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PageSlot {
    Page(i64),
    Gap,
}

/// Page buttons to render: the first and last page plus a window around
/// `current`, with a gap marker wherever numbers are skipped.
pub(crate) fn page_slots(current: i64, total_pages: i64) -> Vec<PageSlot> {
    let mut slots = Vec::new();
    let mut last_shown: Option<i64> = None;
    for page in 1..=total_pages.max(1) {
        let shown = page == 1 || page == total_pages || (page - current).abs() <= PAGE_WINDOW;
        if !shown {
            continue;
        }
        if matches!(last_shown, Some(prev) if prev != page - 1) {
            slots.push(PageSlot::Gap);
        }
        slots.push(PageSlot::Page(page));
        last_shown = Some(page);
    }
    slots
}

pub(crate) fn or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}

/// Open and share links for a table row. A note with a blank identifier has
/// no page to open, so it gets none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RowLinks {
    pub href: String,
    pub share: String,
}

pub(crate) fn row_links(origin: &str, identifier: &str) -> Option<RowLinks> {
    if identifier.trim().is_empty() {
        return None;
    }
    Some(RowLinks {
        href: note_href(identifier),
        share: share_url(origin, identifier),
    })
}

fn redirect_to_login() {
    let _ = window().location().set_href("/admin/login");
}

fn scroll_to_top() {
    window().scroll_to_with_x_and_y(0.0, 0.0);
}

#[component]
pub fn AdminLoginPage() -> impl IntoView {
    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let can_submit = move || can_submit_login(&username.get(), &password.get(), loading.get());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if !can_submit_login(
            &username.get_untracked(),
            &password.get_untracked(),
            loading.get_untracked(),
        ) {
            return;
        }

        let username_val = username.get_untracked();
        let password_val = password.get_untracked();
        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.admin_login(&username_val, &password_val).await {
                Ok(response) => {
                    tracing::info!(username = %username_val, "admin signed in");
                    save_admin_token(&response.access_token);
                    api_client.set_token(response.access_token);
                    app_state.0.api_client.set(api_client);
                    navigate.with_value(|nav| nav("/admin/panel", NavigateOptions::default()));
                }
                Err(e) => {
                    tracing::warn!(username = %username_val, kind = ?e.kind, error = %e, "admin login failed");
                    error.set(Some(login_error_message(&e)));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Tlee"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Admin Login"</CardTitle>
                        <CardDescription class="text-xs">"Access the notes control panel"</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="username" class="text-xs">"Username"</Label>
                                <Input
                                    id="username"
                                    placeholder="admin"
                                    autocomplete="username"
                                    bind_value=username
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    autocomplete="current-password"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">
                                                    {e}
                                                </AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || !can_submit()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Toast {
    seq: u64,
    kind: ToastKind,
    message: String,
}

/// Signals shared by the panel's handlers.
#[derive(Clone, Copy)]
struct PanelState {
    app: AppContext,
    checking_auth: RwSignal<bool>,
    listing: RwSignal<NoteListPage>,
    page: RwSignal<i64>,
    per_page: RwSignal<i64>,
    search: RwSignal<String>,
    loading: RwSignal<bool>,
    error: RwSignal<Option<String>>,
    /// Row awaiting the inline "Sure?" confirmation.
    confirm_delete: RwSignal<Option<i64>>,
    deleting: RwSignal<Option<i64>>,
    toast: RwSignal<Option<Toast>>,
    /// Guards against stale listing responses.
    request_id: RwSignal<u64>,
}

impl PanelState {
    fn new(app: AppContext) -> Self {
        Self {
            app,
            checking_auth: RwSignal::new(true),
            listing: RwSignal::new(NoteListPage::default()),
            page: RwSignal::new(1),
            per_page: RwSignal::new(DEFAULT_PER_PAGE),
            search: RwSignal::new(String::new()),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            confirm_delete: RwSignal::new(None),
            deleting: RwSignal::new(None),
            toast: RwSignal::new(None),
            request_id: RwSignal::new(0),
        }
    }

    fn expire_session(self) {
        tracing::info!("admin session expired");
        self.app.0.sign_out();
        redirect_to_login();
    }

    fn verify_then_load(self) {
        let Some(token) = load_admin_token() else {
            redirect_to_login();
            return;
        };
        self.app.0.api_client.update(|c| c.set_token(token));
        let api_client = self.app.0.api_client.get_untracked();

        spawn_local(async move {
            match api_client.admin_me().await {
                Ok(user) => {
                    tracing::debug!(username = %user.username, "admin token verified");
                    self.app.0.admin_user.set(Some(user));
                    self.checking_auth.set(false);
                    self.load();
                }
                Err(e) => {
                    tracing::warn!(kind = ?e.kind, error = %e, "admin token rejected");
                    self.expire_session();
                }
            }
        });
    }

    fn load(self) {
        let api_client = self.app.0.api_client.get_untracked();
        let query = NoteListQuery::new(
            self.page.get_untracked(),
            self.per_page.get_untracked(),
            &self.search.get_untracked(),
        );

        let req_id = self.request_id.get_untracked().wrapping_add(1);
        self.request_id.set(req_id);
        self.loading.set(true);
        self.error.set(None);

        spawn_local(async move {
            let result = api_client.list_notes(&query).await;
            if self.request_id.get_untracked() != req_id {
                return;
            }
            match result {
                Ok(listing) => {
                    tracing::debug!(page = listing.page, total = listing.total, "notes listed");
                    self.listing.set(listing);
                }
                Err(e) if e.is_unauthorized() => {
                    self.expire_session();
                    return;
                }
                Err(e) => {
                    tracing::error!(kind = ?e.kind, error = %e, "failed to list notes");
                    self.error.set(Some(e.to_string()));
                }
            }
            self.loading.set(false);
        });
    }

    fn go_to_page(self, page: i64) {
        let total = self.listing.get_untracked().total_pages.max(1);
        self.page.set(page.clamp(1, total));
        scroll_to_top();
        self.load();
    }

    fn set_per_page(self, per_page: i64) {
        self.per_page.set(per_page);
        self.page.set(1);
        self.load();
    }

    fn run_search(self) {
        self.page.set(1);
        self.load();
    }

    fn show_toast(self, kind: ToastKind, message: String) {
        let seq = self
            .toast
            .get_untracked()
            .map(|t| t.seq.wrapping_add(1))
            .unwrap_or(1);
        self.toast.set(Some(Toast { seq, kind, message }));

        let toast = self.toast;
        let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            wasm_bindgen::closure::Closure::once_into_js(move || {
                if toast.get_untracked().map(|t| t.seq) == Some(seq) {
                    toast.set(None);
                }
            })
            .as_ref()
            .unchecked_ref(),
            TOAST_MS,
        );
    }

    fn delete(self, id: i64, identifier: String) {
        if self.deleting.get_untracked().is_some() {
            return;
        }
        self.deleting.set(Some(id));
        let api_client = self.app.0.api_client.get_untracked();

        spawn_local(async move {
            match api_client.delete_note(id, &identifier).await {
                Ok(()) => {
                    tracing::info!(id, %identifier, "note deleted");
                    self.listing.update(|l| {
                        l.notes.retain(|n| n.id != id);
                        l.total = (l.total - 1).max(0);
                    });
                    self.confirm_delete.set(None);
                    self.show_toast(ToastKind::Success, "Note deleted successfully!".to_string());
                }
                Err(e) if e.is_unauthorized() => {
                    self.deleting.set(None);
                    self.expire_session();
                    return;
                }
                Err(e) => {
                    tracing::error!(id, %identifier, kind = ?e.kind, error = %e, "failed to delete note");
                    self.show_toast(ToastKind::Error, "Failed to delete note".to_string());
                }
            }
            self.deleting.set(None);
        });
    }
}

#[component]
pub fn AdminPanelPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let panel = PanelState::new(app_state);
    let search_input: RwSignal<String> = RwSignal::new(String::new());

    panel.verify_then_load();

    let on_logout = move |_| {
        panel.app.0.sign_out();
        redirect_to_login();
    };

    let on_search = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        panel.search.set(search_input.get_untracked());
        panel.run_search();
    };

    let on_clear_search = move |_| {
        search_input.set(String::new());
        panel.search.set(String::new());
        panel.run_search();
    };

    let on_per_page = move |ev: web_sys::Event| {
        panel.set_per_page(parse_per_page(&event_target_value(&ev)));
    };

    let stats = move || {
        let l = panel.listing.get();
        (l.total, l.total_pages.max(1))
    };

    view! {
        <Show
            when=move || !panel.checking_auth.get()
            fallback=|| view! {
                <div class="flex min-h-screen items-center justify-center gap-2 text-xs text-muted-foreground">
                    <Spinner />
                    "Checking authentication..."
                </div>
            }
        >
            <div class="min-h-screen bg-background">
                <div class="mx-auto flex w-full max-w-6xl flex-col gap-4 px-4 py-6">
                    <header class="flex flex-wrap items-start justify-between gap-3">
                        <div class="flex flex-col gap-1">
                            <h1 class="text-lg font-semibold">"Notes Control Panel"</h1>
                            <div class="flex items-center gap-2 text-xs text-muted-foreground">
                                <span>
                                    "Welcome, "
                                    {move || panel.app.0.admin_user.get().map(|u| u.username).unwrap_or_default()}
                                    "!"
                                </span>
                                <Button size=ButtonSize::Sm variant=ButtonVariant::Ghost on:click=on_logout>
                                    <LogOut />
                                    "Logout"
                                </Button>
                            </div>
                            <a href="/" class="text-xs text-primary underline-offset-4 hover:underline">"Back to Home"</a>
                        </div>

                        <div class="flex items-center gap-3 text-xs text-muted-foreground">
                            <span>"Total Notes: " <strong>{move || stats().0}</strong></span>
                            <span>
                                "Page: " <strong>{move || panel.page.get()}</strong>
                                " of " {move || stats().1}
                            </span>
                            <span>"Per Page: " <strong>{move || per_page_label(panel.per_page.get())}</strong></span>
                            <Button
                                size=ButtonSize::Icon
                                variant=ButtonVariant::Outline
                                attr:title="Refresh notes"
                                on:click=move |_| panel.load()
                            >
                                <RefreshCw />
                            </Button>
                        </div>
                    </header>

                    <div class="flex flex-wrap items-center justify-between gap-2">
                        <form class="flex items-center gap-1.5" on:submit=on_search>
                            <Input
                                bind_value=search_input
                                placeholder="Search notes..."
                                class="h-8 w-64 text-sm"
                            />
                            <Show
                                when=move || !search_input.get().trim().is_empty()
                                fallback=|| view! {
                                    <Button size=ButtonSize::Sm variant=ButtonVariant::Outline attr:title="Search">
                                        <Search />
                                    </Button>
                                }
                            >
                                <button
                                    type="button"
                                    class="inline-flex h-8 items-center rounded-md border px-2.5 hover:bg-border/50"
                                    title="Clear search"
                                    on:click=on_clear_search
                                >
                                    <X />
                                </button>
                            </Show>
                        </form>

                        <div class="flex items-center gap-2 text-xs">
                            <label r#for="perPage">"Show:"</label>
                            <select
                                id="perPage"
                                class="h-8 rounded-md border border-input bg-transparent px-2 text-xs"
                                prop:value=move || panel.per_page.get().to_string()
                                on:change=on_per_page
                            >
                                {PER_PAGE_CHOICES
                                    .iter()
                                    .map(|v| view! { <option value=v.to_string()>{per_page_label(*v)}</option> })
                                    .collect_view()}
                            </select>
                            <Show when=move || { stats().1 > 1 } fallback=|| ().into_view()>
                                <span class="text-muted-foreground">
                                    {move || format!("Page {} of {}", panel.page.get(), stats().1)}
                                </span>
                            </Show>
                        </div>
                    </div>

                    {move || {
                        if panel.loading.get() {
                            return view! {
                                <div class="flex items-center gap-2 py-8 text-xs text-muted-foreground">
                                    <Spinner />
                                    "Loading notes..."
                                </div>
                            }
                            .into_any();
                        }
                        if let Some(err) = panel.error.get() {
                            return view! {
                                <Alert class="border-destructive/30">
                                    <AlertDescription class="flex items-center justify-between gap-2 text-destructive text-xs">
                                        <span>"Error: " {err}</span>
                                        <Button size=ButtonSize::Sm variant=ButtonVariant::Outline on:click=move |_| panel.load()>
                                            "Retry"
                                        </Button>
                                    </AlertDescription>
                                </Alert>
                            }
                            .into_any();
                        }
                        if panel.listing.with(|l| l.notes.is_empty()) {
                            let msg = if panel.search.get().trim().is_empty() {
                                "No notes yet."
                            } else {
                                "No notes match your search criteria."
                            };
                            return view! {
                                <div class="py-8 text-center text-xs text-muted-foreground">{msg}</div>
                            }
                            .into_any();
                        }
                        view! { <NotesTable panel=panel /> }.into_any()
                    }}

                    <Pagination panel=panel />
                </div>

                {move || {
                    panel.toast.get().map(|t| {
                        let tone = match t.kind {
                            ToastKind::Success => "border-emerald-500/40 text-emerald-700",
                            ToastKind::Error => "border-destructive/40 text-destructive",
                        };
                        view! {
                            <div class=format!("fixed bottom-4 right-4 flex items-center gap-2 rounded-md border bg-card px-3 py-2 text-xs shadow-sm {tone}")>
                                <span>{t.message}</span>
                                <button class="opacity-70 hover:opacity-100" on:click=move |_| panel.toast.set(None)>
                                    <X class="size-3" />
                                </button>
                            </div>
                        }
                    })
                }}
            </div>
        </Show>
    }
}

#[component]
fn NotesTable(panel: PanelState) -> impl IntoView {
    let origin = window().location().origin().unwrap_or_default();

    view! {
        <div class="overflow-x-auto rounded-md border">
            <table class="w-full text-left text-xs">
                <thead class="border-b bg-muted/40 text-muted-foreground">
                    <tr>
                        <th class="px-3 py-2">"ID"</th>
                        <th class="px-3 py-2">"Identifier"</th>
                        <th class="px-3 py-2">"Author"</th>
                        <th class="px-3 py-2">"Content"</th>
                        <th class="px-3 py-2">"Actions"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || panel.listing.get().notes
                        key=|n| n.id
                        children=move |note: AdminNote| {
                            let id = note.id;
                            let links = row_links(&origin, &note.identifier);
                            let share = links.as_ref().map(|l| l.share.clone());
                            let delete_identifier = note.identifier.clone();
                            view! {
                                <tr class="border-b last:border-b-0 align-top">
                                    <td class="px-3 py-2">{id}</td>
                                    <td class="px-3 py-2">
                                        <div class="flex items-center gap-1.5">
                                            <code class="rounded bg-muted px-1">{or_unknown(&note.identifier)}</code>
                                            {share.map(|link| view! {
                                                <button
                                                    class="opacity-70 hover:opacity-100"
                                                    title="Copy link"
                                                    on:click=move |_| copy_to_clipboard(&link)
                                                >
                                                    <CopyIcon class="size-3" />
                                                </button>
                                            })}
                                        </div>
                                    </td>
                                    <td class="px-3 py-2">{or_unknown(&note.author)}</td>
                                    <td class="px-3 py-2 whitespace-pre-wrap break-words">
                                        {truncate_text(&note.note, PREVIEW_CHARS)}
                                    </td>
                                    <td class="px-3 py-2">
                                        <div class="flex items-center gap-1.5">
                                            {links.map(|l| {
                                                let href = l.href;
                                                view! {
                                                    <a href=href.clone() target="_blank" rel="noopener noreferrer" class="text-primary hover:underline">"View"</a>
                                                    <a href=href class="text-primary hover:underline">"Edit"</a>
                                                }
                                            })}
                                            {move || {
                                                if panel.confirm_delete.get() != Some(id) {
                                                    return view! {
                                                        <Button
                                                            size=ButtonSize::Sm
                                                            variant=ButtonVariant::Ghost
                                                            class="text-destructive"
                                                            on:click=move |_| panel.confirm_delete.set(Some(id))
                                                        >
                                                            "Delete"
                                                        </Button>
                                                    }
                                                    .into_any();
                                                }
                                                if panel.deleting.get() == Some(id) {
                                                    return view! {
                                                        <span class="inline-flex items-center gap-1 text-muted-foreground">
                                                            <Spinner class="size-3" />
                                                            "Deleting..."
                                                        </span>
                                                    }
                                                    .into_any();
                                                }
                                                let identifier = delete_identifier.clone();
                                                view! {
                                                    <span class="inline-flex items-center gap-1">
                                                        "Sure?"
                                                        <Button
                                                            size=ButtonSize::Sm
                                                            variant=ButtonVariant::Destructive
                                                            attr:disabled=move || panel.deleting.get().is_some()
                                                            on:click=move |_| panel.delete(id, identifier.clone())
                                                        >
                                                            "Yes"
                                                        </Button>
                                                        <Button
                                                            size=ButtonSize::Sm
                                                            variant=ButtonVariant::Outline
                                                            attr:disabled=move || panel.deleting.get().is_some()
                                                            on:click=move |_| panel.confirm_delete.set(None)
                                                        >
                                                            "No"
                                                        </Button>
                                                    </span>
                                                }
                                                .into_any()
                                            }}
                                        </div>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn Pagination(panel: PanelState) -> impl IntoView {
    let total_pages = move || panel.listing.get().total_pages.max(1);
    let has_prev = move || panel.listing.get().has_prev;
    let has_next = move || panel.listing.get().has_next;

    view! {
        <Show when=move || { total_pages() > 1 } fallback=|| ().into_view()>
            <nav class="flex flex-wrap items-center justify-center gap-1 text-xs">
                <Button size=ButtonSize::Sm variant=ButtonVariant::Outline attr:disabled=move || !has_prev() on:click=move |_| panel.go_to_page(1)>
                    "First"
                </Button>
                <Button size=ButtonSize::Sm variant=ButtonVariant::Outline attr:disabled=move || !has_prev() on:click=move |_| panel.go_to_page(panel.page.get_untracked() - 1)>
                    "Previous"
                </Button>
                {move || {
                    page_slots(panel.page.get(), total_pages())
                        .into_iter()
                        .map(|slot| match slot {
                            PageSlot::Gap => view! { <span class="px-1 text-muted-foreground">"..."</span> }.into_any(),
                            PageSlot::Page(p) => {
                                let variant = if p == panel.page.get_untracked() {
                                    ButtonVariant::Default
                                } else {
                                    ButtonVariant::Outline
                                };
                                view! {
                                    <Button size=ButtonSize::Sm variant=variant on:click=move |_| panel.go_to_page(p)>
                                        {p}
                                    </Button>
                                }
                                .into_any()
                            }
                        })
                        .collect_view()
                }}
                <Button size=ButtonSize::Sm variant=ButtonVariant::Outline attr:disabled=move || !has_next() on:click=move |_| panel.go_to_page(panel.page.get_untracked() + 1)>
                    "Next"
                </Button>
                <Button size=ButtonSize::Sm variant=ButtonVariant::Outline attr:disabled=move || !has_next() on:click=move |_| panel.go_to_page(total_pages())>
                    "Last"
                </Button>
            </nav>
        </Show>
    }
}
