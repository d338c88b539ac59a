//! Dashboard Page
//!
//! Gated on `(authenticated, paid)`: anonymous visitors get a sign-in
//! prompt, authenticated-unpaid users the paywall, paying users the
//! widgets. Payment status comes from the one `api::payment_status` query,
//! refreshed on an interval and after user actions.

use leptos::prelude::*;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;

use crate::api;
use crate::app::{access, Access};
use crate::components::{AuthModal, LifeGridView, QuoteBanner, VirtueRater};

/// Payment status poll interval
const STATUS_POLL_MS: i32 = 30_000;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let user = RwSignal::new(None::<api::AuthUser>);
    let status = RwSignal::new(api::PaymentStatus::default());
    let checked = RwSignal::new(false);
    let show_auth = RwSignal::new(false);

    let refresh = move || {
        leptos::task::spawn_local(async move {
            let me = api::me().await;
            if me.is_some() {
                status.set(api::payment_status().await.unwrap_or_default());
            }
            user.set(me);
            checked.set(true);
        });
    };

    refresh();

    // Poll the subscription state so a completed checkout unlocks the page
    let poll = Closure::<dyn FnMut()>::new(refresh);
    if let Some(window) = web_sys::window() {
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            poll.as_ref().unchecked_ref(),
            STATUS_POLL_MS,
        );
    }
    poll.forget();

    let state = move || access(user.get().is_some(), status.get().is_paid);

    view! {
        <div class="dashboard">
            <Show when=move || checked.get() fallback=|| view! { <p class="loading">"..."</p> }>
                {move || match state() {
                    Access::Landing => view! {
                        <div class="dashboard-guard">
                            <h1>"Memento"</h1>
                            <p>"Sign in to open your dashboard."</p>
                            <button class="btn btn-primary" on:click=move |_| show_auth.set(true)>
                                "Sign in"
                            </button>
                            <AuthModal show=show_auth />
                        </div>
                    }
                    .into_any(),

                    Access::Paywall => view! { <PaywallPanel /> }.into_any(),

                    Access::Dashboard => view! {
                        <div class="dashboard-body">
                            <DashboardHeader user=user />
                            <QuoteBanner />
                            <div class="widgets">
                                <MementoMoriWidget />
                                <VirtueTrackerWidget />
                                <JournalWidget />
                                <MarcusWidget />
                            </div>
                        </div>
                    }
                    .into_any(),
                }}
            </Show>
        </div>
    }
}

#[component]
fn DashboardHeader(user: RwSignal<Option<api::AuthUser>>) -> impl IntoView {
    let sign_out = move |_| {
        api::logout();
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href("/");
        }
    };

    view! {
        <header class="dashboard-header">
            <h1>"Your practice"</h1>
            <div class="account">
                <span class="email">
                    {move || user.get().map(|u| u.email).unwrap_or_default()}
                </span>
                <button class="btn-link" on:click=sign_out>"Sign out"</button>
            </div>
        </header>
    }
}

/// Shown to authenticated users without an active grant
#[component]
fn PaywallPanel() -> impl IntoView {
    let (error, set_error) = signal(None::<String>);

    let checkout = move |price_type: &str| {
        let price_type = price_type.to_string();
        leptos::task::spawn_local(async move {
            match api::create_checkout(&price_type).await {
                Ok(url) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href(&url);
                    }
                }
                Err(e) => set_error.set(Some(e)),
            }
        });
    };

    view! {
        <div class="paywall">
            <h1>"One step left"</h1>
            <p>"Your dashboard unlocks with a plan. The page refreshes itself after checkout."</p>

            <Show when=move || error.get().is_some()>
                <p class="error">{move || error.get().unwrap_or_default()}</p>
            </Show>

            <div class="paywall-plans">
                <button class="btn btn-primary" on:click=move |_| checkout("monthly")>
                    "Monthly · £9/month"
                </button>
                <button class="btn" on:click=move |_| checkout("lifetime")>
                    "Lifetime · £49 once"
                </button>
            </div>
        </div>
    }
}

#[component]
fn MementoMoriWidget() -> impl IntoView {
    let grid = RwSignal::new(None::<api::LifeGrid>);
    let loaded = RwSignal::new(false);
    let (year_input, set_year_input) = signal(String::new());
    let (error, set_error) = signal(None::<String>);

    let load = move || {
        leptos::task::spawn_local(async move {
            if let Ok(result) = api::life_grid().await {
                grid.set(result);
            }
            loaded.set(true);
        });
    };

    load();

    let save_year = move |_| {
        let Ok(year) = year_input.get().trim().parse::<i32>() else {
            set_error.set(Some("Enter a year, like 1990".into()));
            return;
        };
        set_error.set(None);
        leptos::task::spawn_local(async move {
            match api::set_birth_year(year).await {
                Ok(_) => load(),
                Err(e) => set_error.set(Some(e)),
            }
        });
    };

    view! {
        <section class="widget memento-mori">
            <h2>"Memento Mori"</h2>
            <Show when=move || loaded.get() fallback=|| view! { <p class="loading">"..."</p> }>
                {move || match grid.get() {
                    Some(grid) => view! { <LifeGridView grid=grid /> }.into_any(),
                    None => view! {
                        <div class="birth-year-form">
                            <p>"When were you born?"</p>
                            <input
                                type="number"
                                placeholder="1990"
                                prop:value=move || year_input.get()
                                on:input=move |ev| set_year_input.set(event_target_value(&ev))
                            />
                            <button class="btn" on:click=save_year>"Show my grid"</button>
                            <Show when=move || error.get().is_some()>
                                <p class="error">{move || error.get().unwrap_or_default()}</p>
                            </Show>
                        </div>
                    }
                    .into_any(),
                }}
            </Show>
        </section>
    }
}

#[component]
fn VirtueTrackerWidget() -> impl IntoView {
    let courage = RwSignal::new(0u8);
    let wisdom = RwSignal::new(0u8);
    let justice = RwSignal::new(0u8);
    let temperance = RwSignal::new(0u8);
    let (message, set_message) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let submit = move |_| {
        if busy.get() {
            return;
        }
        let ratings = api::VirtueRatings {
            courage: courage.get(),
            wisdom: wisdom.get(),
            justice: justice.get(),
            temperance: temperance.get(),
        };
        set_busy.set(true);

        leptos::task::spawn_local(async move {
            match api::submit_virtues(ratings).await {
                Ok(_) => {
                    set_message.set(Some("Saved for today.".into()));
                    courage.set(0);
                    wisdom.set(0);
                    justice.set(0);
                    temperance.set(0);
                }
                Err(e) => set_message.set(Some(e)),
            }
            set_busy.set(false);
        });
    };

    view! {
        <section class="widget virtue-tracker">
            <h2>"Virtue Tracker"</h2>
            <div class="virtues">
                <VirtueRater name="Courage" value=courage />
                <VirtueRater name="Wisdom" value=wisdom />
                <VirtueRater name="Justice" value=justice />
                <VirtueRater name="Temperance" value=temperance />
            </div>
            <button class="btn" on:click=submit disabled=move || busy.get()>
                {move || if busy.get() { "..." } else { "Track today" }}
            </button>
            <Show when=move || message.get().is_some()>
                <p class="note">{move || message.get().unwrap_or_default()}</p>
            </Show>
        </section>
    }
}

#[component]
fn JournalWidget() -> impl IntoView {
    let entries = RwSignal::new(Vec::<api::JournalEntry>::new());
    let (draft, set_draft) = signal(String::new());
    let (error, set_error) = signal(None::<String>);

    let load = move || {
        leptos::task::spawn_local(async move {
            if let Ok(recent) = api::journal_entries(5).await {
                entries.set(recent);
            }
        });
    };

    load();

    let save = move |_| {
        let content = draft.get();
        if content.trim().is_empty() {
            return;
        }
        set_error.set(None);
        leptos::task::spawn_local(async move {
            match api::add_journal_entry(&content).await {
                Ok(_) => {
                    set_draft.set(String::new());
                    load();
                }
                Err(e) => set_error.set(Some(e)),
            }
        });
    };

    view! {
        <section class="widget journal">
            <h2>"Journal"</h2>
            <textarea
                placeholder="What did the day teach you?"
                prop:value=move || draft.get()
                on:input=move |ev| set_draft.set(event_target_value(&ev))
            />
            <button class="btn" on:click=save>"Save entry"</button>
            <Show when=move || error.get().is_some()>
                <p class="error">{move || error.get().unwrap_or_default()}</p>
            </Show>

            <ul class="journal-entries">
                <For
                    each=move || entries.get()
                    key=|entry| entry.id.clone()
                    children=move |entry| {
                        view! { <li><p>{entry.content.clone()}</p></li> }
                    }
                />
            </ul>
        </section>
    }
}

#[component]
fn MarcusWidget() -> impl IntoView {
    let exchanges = RwSignal::new(Vec::<api::Exchange>::new());

    leptos::task::spawn_local(async move {
        if let Ok(recent) = api::chat_history(3).await {
            exchanges.set(recent);
        }
    });

    view! {
        <section class="widget marcus">
            <h2>"MarcusGPT"</h2>
            <ul class="recent-exchanges">
                <For
                    each=move || exchanges.get()
                    key=|exchange| exchange.id.clone()
                    children=move |exchange| {
                        view! {
                            <li>
                                <p class="you">{exchange.user_message.clone()}</p>
                                <p class="marcus">{exchange.ai_response.clone()}</p>
                            </li>
                        }
                    }
                />
            </ul>
            <a href="/marcus" class="btn btn-primary">"Speak with Marcus"</a>
        </section>
    }
}
