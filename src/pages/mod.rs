use crate::api::TokenAuthProvider;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardFooter, CardHeader, CardItem, CardList, CardTitle, Input, Label, Spinner,
};
use crate::error::{AuthError, Notice};
use crate::flows::location::picker_params;
use crate::flows::Provenance;
use crate::models::{Coordinates, Document, JOURNALS_COLLECTION};
use crate::navigation::{screens, RegionId, RouteParams, JOURNAL_ID_PARAM};
use crate::state::AppContext;
use icons::ChevronRight;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::Arc;

/// View for a screen name of either navigation tree.
pub(crate) fn screen_view(name: &'static str) -> AnyView {
    match name {
        screens::LOGIN => view! { <LoginPage /> }.into_any(),
        screens::SIGNUP => view! { <SignupPage /> }.into_any(),
        screens::HOME => view! {
            <PlaceholderPage title="Welcome" description="Browse the menu and place an order." />
        }
        .into_any(),
        screens::HISTORY => view! {
            <PlaceholderPage title="Order history" description="Your past orders show up here." />
        }
        .into_any(),
        screens::FAVORITE => view! {
            <PlaceholderPage title="Favorites" description="Items you saved for later." />
        }
        .into_any(),
        screens::CART => view! { <CartPage /> }.into_any(),
        screens::PAYMENT => view! {
            <PlaceholderPage title="Payment" description="Payment is handled by the checkout provider." />
        }
        .into_any(),
        screens::PROFILE => view! { <ProfilePage /> }.into_any(),
        screens::JOURNAL => view! { <JournalPage /> }.into_any(),
        screens::ADD_JOURNAL => view! {
            <PlaceholderPage title="New journal" description="Write down what you tasted today." />
        }
        .into_any(),
        screens::JOURNAL_DETAIL => view! { <JournalDetailPage /> }.into_any(),
        screens::EDIT_PROFILE => view! { <EditProfilePage /> }.into_any(),
        screens::MAP => view! { <MapPickerPage /> }.into_any(),
        _ => view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }
            .into_any(),
    }
}

pub(crate) fn auth_error_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::Rejected { status: 401 | 403, .. } => "Invalid email or password.",
        AuthError::Rejected { .. } => "The server rejected the request. Please try again.",
        AuthError::Network(_) => "Could not reach the server. Check your connection.",
        AuthError::Parse(_) => "Unexpected response from the server.",
    }
}

#[component]
fn ErrorAlert(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some() fallback=|| ().into_view()>
            {move || {
                message.get().map(|e| {
                    view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    }
                })
            }}
        </Show>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let auth = expect_context::<Arc<TokenAuthProvider>>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let auth = auth.clone();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            // On success the session flips and this page is unmounted.
            if let Err(e) = auth.sign_in(&email_val, &password_val).await {
                let _ = error.try_set(Some(auth_error_message(&e).to_string()));
            }
            let _ = loading.try_set(false);
        });
    };

    let to_signup = move |_: ev::MouseEvent| app_state.0.navigate(screens::SIGNUP, None);

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
            <div class="mb-6 text-center text-sm font-medium text-foreground">"Cafe"</div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Log in"</CardTitle>
                    <CardDescription class="text-xs">"Use your email and password to continue."</CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="email" class="text-xs">"Email"</Label>
                            <Input
                                id="email"
                                r#type="email"
                                placeholder="you@example.com"
                                bind_value=email
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
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <ErrorAlert message=error />

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if loading.get() { "Signing in..." } else { "Continue" }}
                            </span>
                        </Button>

                        <div class="pt-1 text-xs text-muted-foreground">
                            "No account? "
                            <button
                                type="button"
                                class="text-primary underline underline-offset-4"
                                on:click=to_signup
                            >
                                "Sign up"
                            </button>
                        </div>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let auth = expect_context::<Arc<TokenAuthProvider>>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();

        if password_val != confirm_password.get() {
            error.set(Some("Passwords do not match.".to_string()));
            return;
        }

        let auth = auth.clone();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            if let Err(e) = auth.sign_up(&email_val, &password_val).await {
                let _ = error.try_set(Some(auth_error_message(&e).to_string()));
            }
            let _ = loading.try_set(false);
        });
    };

    let to_login = move |_: ev::MouseEvent| app_state.0.navigate(screens::LOGIN, None);

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
            <div class="mb-6 text-center text-sm font-medium text-foreground">"Cafe"</div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Create account"</CardTitle>
                    <CardDescription class="text-xs">"Sign up with your email address."</CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="signup-email" class="text-xs">"Email"</Label>
                            <Input
                                id="signup-email"
                                r#type="email"
                                placeholder="you@example.com"
                                bind_value=email
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="signup-password" class="text-xs">"Password"</Label>
                            <Input
                                id="signup-password"
                                r#type="password"
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="signup-confirm" class="text-xs">"Confirm password"</Label>
                            <Input
                                id="signup-confirm"
                                r#type="password"
                                bind_value=confirm_password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <ErrorAlert message=error />

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if loading.get() { "Creating account..." } else { "Sign up" }}
                            </span>
                        </Button>

                        <div class="pt-1 text-xs text-muted-foreground">
                            "Already registered? "
                            <button
                                type="button"
                                class="text-primary underline underline-offset-4"
                                on:click=to_login
                            >
                                "Log in"
                            </button>
                        </div>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn PlaceholderPage(title: &'static str, description: &'static str) -> impl IntoView {
    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-6">
            <Card>
                <CardHeader>
                    <CardTitle>{title}</CardTitle>
                    <CardDescription>{description}</CardDescription>
                </CardHeader>
            </Card>
        </div>
    }
}

#[component]
fn CartPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-6">
            <Card>
                <CardHeader>
                    <CardTitle>"Cart"</CardTitle>
                    <CardDescription>"Review your order before checking out."</CardDescription>
                </CardHeader>
                <CardFooter>
                    <Button
                        size=ButtonSize::Sm
                        on:click=move |_| app_state.0.navigate(screens::PAYMENT, None)
                    >
                        "Checkout"
                    </Button>
                </CardFooter>
            </Card>
        </div>
    }
}

/// Profile menu entries that only announce upcoming features.
const COMING_SOON: [(&str, &str, &str); 5] = [
    ("Payment Methods", "Payments", "Payment methods coming soon"),
    ("Delivery Addresses", "Addresses", "Address management coming soon"),
    ("Notifications", "Notifications", "Notification settings coming soon"),
    ("Help & Support", "Support", "Support center coming soon"),
    ("About Us", "About", "About page coming soon"),
];

#[component]
fn ProfilePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let session = app_state.0.session;

    let email = move || {
        session.with(|s| {
            s.user()
                .and_then(|u| u.email.clone())
                .unwrap_or_default()
        })
    };
    let member_since = js_sys::Date::new_0().get_full_year();

    let stat = |label: &'static str, target: &str| {
        let state = app_state.0.clone();
        let target = target.to_string();
        view! {
            <button
                class="flex flex-1 flex-col items-center py-3 text-xs text-muted-foreground hover:text-foreground"
                on:click=move |_| state.navigate(&target, None)
            >
                {label}
            </button>
        }
    };

    let account_state = app_state.0.clone();
    let notice = app_state.0.notice;

    view! {
        <div class="mx-auto w-full max-w-2xl space-y-4 px-4 py-6">
            <div class="rounded-xl bg-primary px-4 py-6 text-center text-primary-foreground">
                <div class="text-base font-semibold">{email}</div>
                <div class="text-xs opacity-80">{format!("Member since {member_since}")}</div>
            </div>

            <div class="flex divide-x rounded-xl border bg-card shadow-sm">
                {stat("Orders", RegionId::History.as_ref())}
                {stat("Favorites", RegionId::Favorite.as_ref())}
                {stat("Journal", screens::JOURNAL)}
            </div>

            <Card class="py-2">
                <CardContent>
                    <CardList>
                        <CardItem>
                            <button
                                class="flex w-full items-center justify-between text-sm"
                                on:click=move |_| account_state.navigate(screens::EDIT_PROFILE, None)
                            >
                                "Account Settings"
                                <ChevronRight />
                            </button>
                        </CardItem>
                        {COMING_SOON
                            .iter()
                            .map(|&(label, title, message)| {
                                view! {
                                    <CardItem>
                                        <button
                                            class="flex w-full items-center justify-between text-sm"
                                            on:click=move |_| notice.set(Some(Notice::new(title, message)))
                                        >
                                            {label}
                                            <ChevronRight />
                                        </button>
                                    </CardItem>
                                }
                            })
                            .collect_view()}
                    </CardList>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn JournalPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let journal_id: RwSignal<String> = RwSignal::new(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let id = journal_id.get().trim().to_string();
        if id.is_empty() {
            return;
        }
        let mut params = RouteParams::new();
        params.insert(JOURNAL_ID_PARAM.to_string(), id.into());
        app_state.0.navigate(screens::JOURNAL_DETAIL, Some(params));
    };

    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-6">
            <Card>
                <CardHeader>
                    <CardTitle>"Journal"</CardTitle>
                    <CardDescription>"Open an entry to read it, or add a new one from the header."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="flex items-end gap-2" on:submit=on_submit>
                        <div class="flex flex-1 flex-col gap-1.5">
                            <Label html_for="journal-id" class="text-xs">"Entry id"</Label>
                            <Input id="journal-id" bind_value=journal_id class="h-8 text-sm" />
                        </div>
                        <Button size=ButtonSize::Sm>"Open"</Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Loaded {
    Pending,
    Found(Document),
    Missing,
    Failed(String),
}

fn text_field(doc: &Document, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| doc.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[component]
fn JournalDetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let loaded: RwSignal<Loaded> = RwSignal::new(Loaded::Pending);

    let journal_id = app_state.0.navigator.with_untracked(|n| {
        n.focused()
            .params
            .and_then(|p| p.get(JOURNAL_ID_PARAM).and_then(|v| v.as_str().map(str::to_string)))
    });

    match journal_id {
        Some(id) => {
            let store = app_state.0.services.store.clone();
            spawn_local(async move {
                let next = match store.get_one(&id, JOURNALS_COLLECTION).await {
                    Ok(Some(doc)) => Loaded::Found(doc),
                    Ok(None) => Loaded::Missing,
                    Err(err) => Loaded::Failed(err.to_string()),
                };
                let _ = loaded.try_set(next);
            });
        }
        None => loaded.set(Loaded::Missing),
    }

    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-6">
            {move || match loaded.get() {
                Loaded::Pending => view! {
                    <div class="flex justify-center py-8"><Spinner /></div>
                }
                .into_any(),
                Loaded::Found(doc) => {
                    let title = text_field(&doc, &["title"]).unwrap_or_else(|| "Untitled".to_string());
                    let body = text_field(&doc, &["text", "content"]).unwrap_or_default();
                    view! {
                        <Card>
                            <CardHeader>
                                <CardTitle>{title}</CardTitle>
                            </CardHeader>
                            <CardContent>
                                <p class="whitespace-pre-wrap text-sm">{body}</p>
                            </CardContent>
                        </Card>
                    }
                    .into_any()
                }
                Loaded::Missing => view! {
                    <div class="py-8 text-center text-xs text-muted-foreground">"This entry no longer exists."</div>
                }
                .into_any(),
                Loaded::Failed(e) => view! {
                    <Alert class="border-destructive/30">
                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                    </Alert>
                }
                .into_any(),
            }}
        </div>
    }
}

fn provenance_label(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Persisted => "Saved location",
        Provenance::Sensed => "Current location",
        Provenance::Picked => "Selected on the map",
    }
}

fn format_coordinates(c: Coordinates) -> String {
    format!("{:.5}, {:.5}", c.latitude, c.longitude)
}

#[component]
fn EditProfilePage() -> impl IntoView {
    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-6">
            <Card>
                <CardHeader>
                    <CardTitle>"Delivery location"</CardTitle>
                    <CardDescription>"Use your current position or pick a spot on the map."</CardDescription>
                </CardHeader>
                <CardContent>
                    <LocationManager />
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn LocationManager() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let location = app_state.0.location;
    let locating: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);

    {
        let state = app_state.0.clone();
        spawn_local(async move {
            state.load_persisted_location().await;
        });
    }

    {
        let state = app_state.0.clone();
        let navigator = state.navigator;
        Effect::new(move |_| {
            navigator.track();
            state.apply_focused_route_params();
        });
    }

    let on_locate = {
        let state = app_state.0.clone();
        move |_: ev::MouseEvent| {
            let state = state.clone();
            locating.set(true);
            spawn_local(async move {
                state.acquire_location().await;
                let _ = locating.try_set(false);
            });
        }
    };

    let on_pick = {
        let state = app_state.0.clone();
        move |_: ev::MouseEvent| state.open_map_picker()
    };

    let on_save = {
        let state = app_state.0.clone();
        move |_: ev::MouseEvent| {
            let state = state.clone();
            saving.set(true);
            spawn_local(async move {
                state.save_location().await;
                let _ = saving.try_set(false);
            });
        }
    };

    let can_save = Memo::new(move |_| location.with(|l| l.can_save()));

    view! {
        <div class="flex flex-col gap-3">
            <div class="flex flex-wrap gap-2">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:disabled=move || locating.get()
                    on:click=on_locate
                >
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || locating.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Locate Me"
                    </span>
                </Button>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_pick>
                    "Let me choose on the map"
                </Button>
            </div>

            <div class="rounded-md border border-border bg-muted px-3 py-2 text-sm">
                {move || {
                    location.with(|l| match (l.current(), l.provenance()) {
                        (Some(c), Some(p)) => format!("{}: {}", provenance_label(p), format_coordinates(c)),
                        _ => "No location set".to_string(),
                    })
                }}
            </div>

            <Button
                size=ButtonSize::Sm
                attr:disabled=move || !can_save.get() || saving.get()
                on:click=on_save
            >
                <span class="inline-flex items-center gap-2">
                    <Show when=move || saving.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    "Save My Location"
                </span>
            </Button>
        </div>
    }
}

pub(crate) fn parse_coordinates(latitude: &str, longitude: &str) -> Option<Coordinates> {
    let parse = |s: &str| s.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    Some(Coordinates::new(parse(latitude)?, parse(longitude)?))
}

#[component]
fn MapPickerPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let current = app_state.0.location.with_untracked(|l| l.current());

    let latitude: RwSignal<String> =
        RwSignal::new(current.map(|c| c.latitude.to_string()).unwrap_or_default());
    let longitude: RwSignal<String> =
        RwSignal::new(current.map(|c| c.longitude.to_string()).unwrap_or_default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match parse_coordinates(&latitude.get(), &longitude.get()) {
            Some(coordinates) => {
                error.set(None);
                app_state
                    .0
                    .navigate(screens::EDIT_PROFILE, Some(picker_params(coordinates)));
            }
            None => error.set(Some("Enter latitude and longitude as numbers.".to_string())),
        }
    };

    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-6">
            <Card>
                <CardHeader>
                    <CardTitle>"Choose location"</CardTitle>
                    <CardDescription>"Enter the coordinates of your delivery spot."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="latitude" class="text-xs">"Latitude"</Label>
                            <Input
                                id="latitude"
                                r#type="number"
                                step="any"
                                bind_value=latitude
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="longitude" class="text-xs">"Longitude"</Label>
                            <Input
                                id="longitude"
                                r#type="number"
                                step="any"
                                bind_value=longitude
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <ErrorAlert message=error />

                        <Button size=ButtonSize::Sm>"Use this location"</Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}
