use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Text input bound to a `RwSignal<String>`.
#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(into, default = "off")] autocomplete: &'static str,
    #[prop(optional)] required: bool,

    // Manual wiring instead of `bind:value`; keeps the signal as the single source.
    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground dark:bg-input/30 border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs transition-[color,box-shadow] outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm",
        "focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2",
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            bind_value.set(input.value());
        }
    };

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            id=id
            autocomplete=autocomplete
            required=required
            prop:value=move || bind_value.get()
            on:input=on_input
        />
    }
}
