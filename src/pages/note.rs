use crate::components::ui::{Button, ButtonSize, ButtonVariant, Input, Spinner};
use crate::config::AUTOSAVE_QUIET_MS;
use crate::editor::NoteEditor;
use crate::models::NoteMode;
use crate::state::{AppContext, AutosaveController, SyncStatus};
use crate::storage::{load_note_mode, save_note_mode};
use crate::util::{copy_to_clipboard, generate_random_hero_name, normalize_identifier, note_href};
use icons::{Check, Code, Copy as CopyIcon, FileText};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params};
use leptos_router::params::Params;
use leptos_router::NavigateOptions;
use wasm_bindgen::JsCast;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct NoteRouteParams {
    pub identifier: Option<String>,
}

/// `/`: picks a random identifier and replaces the history entry with it.
#[component]
pub fn RootPage() -> impl IntoView {
    let navigate = use_navigate();

    Effect::new(move |_| {
        let identifier = generate_random_hero_name();
        tracing::debug!(%identifier, "opening fresh note");
        navigate(
            &note_href(&identifier),
            NavigateOptions {
                replace: true,
                ..Default::default()
            },
        );
    });

    view! {
        <div class="flex min-h-screen items-center justify-center gap-2 text-xs text-muted-foreground">
            <Spinner />
            "Opening a fresh note..."
        </div>
    }
}

#[component]
pub fn NotePage() -> impl IntoView {
    let params = use_params::<NoteRouteParams>();

    // One editing session per identifier: a new identifier tears the old one down.
    let identifier = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.identifier)
            .and_then(|raw| normalize_identifier(&raw))
    });

    move || match identifier.get() {
        Some(identifier) => view! { <NoteSession identifier=identifier /> }.into_any(),
        None => view! { <RootPage /> }.into_any(),
    }
}

#[component]
fn NoteSession(identifier: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let content: RwSignal<String> = RwSignal::new(String::new());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let status: RwSignal<SyncStatus> = RwSignal::new(SyncStatus::Idle);
    let mode: RwSignal<NoteMode> = RwSignal::new(load_note_mode(&identifier));
    let goto_value: RwSignal<String> = RwSignal::new(String::new());
    let copied: RwSignal<bool> = RwSignal::new(false);

    let api_client = app_state.0.api_client.get_untracked();
    let controller = AutosaveController::for_browser(
        &identifier,
        String::new(),
        AUTOSAVE_QUIET_MS,
        api_client.clone(),
        move |s| status.set(s),
    );
    let controller = StoredValue::new(controller);

    on_cleanup(move || {
        controller.with_value(|c| c.dispose());
    });

    {
        let identifier = identifier.clone();
        spawn_local(async move {
            match api_client.get_note(&identifier).await {
                Ok(text) => content.set(text),
                Err(e) => {
                    tracing::error!(%identifier, kind = ?e.kind, error = %e, "failed to load note");
                }
            }
            loading.set(false);
        });
    }

    let on_change = Callback::new(move |text: String| {
        controller.with_value(|c| c.on_change(&text));
    });

    let toggle_mode = {
        let identifier = identifier.clone();
        move |_| {
            let next = match mode.get_untracked() {
                NoteMode::Text => NoteMode::Code,
                NoteMode::Code => NoteMode::Text,
            };
            mode.set(next);
            save_note_mode(&identifier, next);
        }
    };

    let on_copy = move |_| {
        copy_to_clipboard(&content.get_untracked());
        copied.set(true);
        let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            wasm_bindgen::closure::Closure::once_into_js(move || {
                copied.set(false);
            })
            .as_ref()
            .unchecked_ref(),
            2000,
        );
    };

    let on_goto = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let target = normalize_identifier(&goto_value.get_untracked())
            .unwrap_or_else(generate_random_hero_name);
        goto_value.set(String::new());
        navigate.with_value(|nav| nav(&note_href(&target), NavigateOptions::default()));
    };

    let title = identifier.clone();

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex w-full max-w-4xl flex-col gap-3 px-4 py-6">
                <header class="flex flex-wrap items-center justify-between gap-2">
                    <div class="flex min-w-0 items-center gap-2">
                        <a href="/" class="text-sm font-medium text-foreground">"Tlee"</a>
                        <span class="text-xs text-muted-foreground">"/"</span>
                        <span class="truncate text-sm font-medium" title=title.clone()>{title.clone()}</span>
                    </div>

                    <div class="flex items-center gap-2">
                        <form class="flex items-center gap-1.5" on:submit=on_goto>
                            <Input
                                bind_value=goto_value
                                placeholder="Go to page..."
                                class="h-8 w-40 text-xs"
                            />
                            <Button size=ButtonSize::Sm variant=ButtonVariant::Outline>
                                "Go"
                            </Button>
                        </form>

                        <Button
                            size=ButtonSize::Sm
                            variant=ButtonVariant::Outline
                            attr:title=move || match mode.get() {
                                NoteMode::Text => "Switch to code mode",
                                NoteMode::Code => "Switch to text mode",
                            }
                            on:click=toggle_mode
                        >
                            {move || match mode.get() {
                                NoteMode::Text => view! { <Code /> "Code" }.into_any(),
                                NoteMode::Code => view! { <FileText /> "Text" }.into_any(),
                            }}
                        </Button>

                        <Button
                            size=ButtonSize::Sm
                            variant=ButtonVariant::Outline
                            on:click=on_copy
                        >
                            {move || if copied.get() {
                                view! { <Check /> "Copied" }.into_any()
                            } else {
                                view! { <CopyIcon /> "Copy" }.into_any()
                            }}
                        </Button>
                    </div>
                </header>

                <Show
                    when=move || !loading.get()
                    fallback=|| view! {
                        <div class="flex items-center gap-2 py-8 text-xs text-muted-foreground">
                            <Spinner />
                            "Loading..."
                        </div>
                    }
                >
                    <NoteEditor value=content mode=mode on_change=on_change />
                </Show>

                <footer class="flex items-center justify-between text-xs text-muted-foreground">
                    <span class="inline-flex items-center gap-1.5">
                        <Show when=move || status.get().is_syncing() fallback=|| ().into_view()>
                            <Spinner class="size-3" />
                        </Show>
                        {move || status.get().label()}
                    </span>
                    <span>{move || match mode.get() {
                        NoteMode::Text => "Text",
                        NoteMode::Code => "Code",
                    }}</span>
                </footer>
            </div>
        </div>
    }
}
