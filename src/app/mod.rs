use crate::pages::{AdminLoginPage, AdminPanelPage, NotePage, RootPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // Static admin routes are matched ahead of the `:identifier` catch.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("admin/login") view=AdminLoginPage />
                <Route path=path!("admin/panel") view=AdminPanelPage />
                <Route path=path!(":identifier") view=NotePage />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
    }
}
