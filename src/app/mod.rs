use crate::api::{ApiClient, EnvConfig, RestDocumentStore, TokenAuthProvider, DEFAULT_LOG_LEVEL};
use crate::components::ui::{Alert, AlertDescription, AlertTitle, Button, ButtonSize, ButtonVariant};
use crate::components::ConfirmDialog;
use crate::logging::init_logging;
use crate::navigation::{HeaderAction, RegionId};
use crate::pages::screen_view;
use crate::sensor::BrowserLocationSensor;
use crate::session::SessionObserver;
use crate::state::{AppContext, AppState, Services};
use icons::{ChevronLeft, LogOut, Plus, Trash2, X};
use leptos::prelude::*;
use log::{info, warn};
use std::sync::Arc;

#[component]
pub fn App() -> impl IntoView {
    let config = EnvConfig::new();
    if let Err(err) = init_logging(&config.log_level) {
        let _ = init_logging(DEFAULT_LOG_LEVEL);
        warn!("event=logging_init module=app status=fallback error={err}");
    }

    let client = ApiClient::new(config.api_url.clone());
    let auth = Arc::new(TokenAuthProvider::restore(client.clone()));
    let store = Arc::new(RestDocumentStore::new(client));
    let sensor = Arc::new(BrowserLocationSensor::new());

    let mut observer = SessionObserver::new();
    observer.start(auth.as_ref());
    let app_state = AppState::new(
        Services {
            auth: auth.clone(),
            store,
            sensor,
        },
        observer.session(),
    );
    let observer = StoredValue::new(observer);
    on_cleanup(move || observer.update_value(SessionObserver::stop));

    provide_context(AppContext(app_state.clone()));
    provide_context(auth);
    info!("event=app_start module=app status=ok");

    // The session decides which tree is mounted.
    let nav_state = app_state.clone();
    Effect::new(move |_| {
        nav_state.session.track();
        nav_state.sync_navigation();
    });

    view! { <AppShell /> }
}

#[component]
fn AppShell() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigator = app_state.0.navigator;

    // Pages remount whenever a different stack entry is focused.
    let focused = Memo::new(move |_| {
        navigator.with(|n| {
            let ctx = n.focused();
            (ctx.key, ctx.screen)
        })
    });
    let header_shown = Memo::new(move |_| navigator.with(|n| n.tree().header_shown()));
    let tab_bar_visible = Memo::new(move |_| navigator.with(|n| n.tree().tab_bar_visible()));

    view! {
        <div class="flex min-h-screen flex-col bg-background">
            <Show when=move || header_shown.get() fallback=|| ().into_view()>
                <ScreenHeader />
            </Show>

            <main class="flex-1 overflow-y-auto">
                {move || {
                    let (_, screen) = focused.get();
                    screen_view(screen)
                }}
            </main>

            <Show when=move || tab_bar_visible.get() fallback=|| ().into_view()>
                <TabBar />
            </Show>

            <ConfirmDialog />
            <NoticeBanner />
        </div>
    }
}

#[component]
fn ScreenHeader() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigator = app_state.0.navigator;

    let title = Memo::new(move |_| navigator.with(|n| n.tree().title()));
    let can_go_back = Memo::new(move |_| navigator.with(|n| n.tree().depth() > 1));

    let back_state = app_state.0.clone();
    let actions_state = app_state.0.clone();

    view! {
        <header class="sticky top-0 z-40 flex h-12 items-center gap-2 border-b border-border bg-background px-3">
            <Show when=move || can_go_back.get() fallback=|| ().into_view()>
                {
                    let state = back_state.clone();
                    view! {
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            attr:aria-label="Back"
                            on:click=move |_| state.go_back()
                        >
                            <ChevronLeft />
                        </Button>
                    }
                }
            </Show>
            <div class="flex-1 truncate text-sm font-medium">{move || title.get()}</div>
            <div class="flex items-center gap-1">
                {move || {
                    actions_state
                        .header_actions()
                        .into_iter()
                        .map(|action| view! { <HeaderButton action=action /> })
                        .collect_view()
                }}
            </div>
        </header>
    }
}

#[component]
fn HeaderButton(action: HeaderAction) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let label = match &action {
        HeaderAction::Logout => "Logout",
        HeaderAction::Add { .. } => "Add",
        HeaderAction::Delete { .. } => "Delete",
    };
    let icon = match &action {
        HeaderAction::Logout => view! { <LogOut /> }.into_any(),
        HeaderAction::Add { .. } => view! { <Plus /> }.into_any(),
        HeaderAction::Delete { .. } => view! { <Trash2 /> }.into_any(),
    };

    view! {
        <Button
            variant=ButtonVariant::Ghost
            size=ButtonSize::Icon
            attr:aria-label=label
            attr:title=label
            on:click=move |_| app_state.0.dispatch(action.clone())
        >
            {icon}
        </Button>
    }
}

fn tab_label(region: RegionId) -> &'static str {
    match region {
        RegionId::Auth => "",
        RegionId::Home => "Home",
        RegionId::History => "History",
        RegionId::Favorite => "Favorites",
        RegionId::Cart => "Cart",
        RegionId::Profile => "Profile",
    }
}

#[component]
fn TabBar() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigator = app_state.0.navigator;

    view! {
        <nav class="sticky bottom-0 z-40 grid grid-cols-5 border-t border-border bg-background">
            {move || {
                navigator
                    .with(|n| n.tree().tabs())
                    .into_iter()
                    .map(|tab| {
                        let state = app_state.0.clone();
                        let class = if tab.focused {
                            "flex h-14 flex-col items-center justify-center text-xs font-medium text-primary"
                        } else {
                            "flex h-14 flex-col items-center justify-center text-xs text-muted-foreground"
                        };
                        view! {
                            <button
                                class=class
                                data-icon=tab.icon
                                aria-current=if tab.focused { Some("page") } else { None }
                                on:click=move |_| state.focus_tab(tab.region)
                            >
                                {tab_label(tab.region)}
                            </button>
                        }
                    })
                    .collect_view()
            }}
        </nav>
    }
}

#[component]
fn NoticeBanner() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notice = app_state.0.notice;

    view! {
        <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
            <div class="fixed inset-x-0 bottom-16 z-50 flex justify-center px-4">
                <Alert class="max-w-sm border-destructive/30 bg-background shadow-lg">
                    <div class="flex items-start gap-2">
                        <div class="flex-1">
                            <AlertTitle>{move || notice.get().map(|n| n.title).unwrap_or_default()}</AlertTitle>
                            <AlertDescription class="text-xs text-muted-foreground">
                                {move || notice.get().map(|n| n.message).unwrap_or_default()}
                            </AlertDescription>
                        </div>
                        <button
                            class="text-muted-foreground hover:text-foreground"
                            aria-label="Dismiss"
                            on:click=move |_| notice.set(None)
                        >
                            <X class="size-4" />
                        </button>
                    </div>
                </Alert>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{compose, select_tree};

    #[test]
    fn test_every_tab_has_a_label() {
        for tab in compose(select_tree(true)).tabs() {
            assert!(!tab_label(tab.region).is_empty());
        }
    }
}
