//! UI Components

use leptos::prelude::*;

use crate::api;

/// A single rendered chat line
#[derive(Clone, Debug, PartialEq)]
pub struct ChatLine {
    pub role: String,
    pub content: String,
}

/// Message bubble component
#[component]
pub fn MessageBubble(line: ChatLine) -> impl IntoView {
    let class = format!("message message-{}", line.role);

    view! {
        <div class=class>
            <span class="role">{line.role.clone()}</span>
            <p class="content">{line.content.clone()}</p>
        </div>
    }
}

/// Today's quote, fetched once on mount
#[component]
pub fn QuoteBanner() -> impl IntoView {
    let (quote, set_quote) = signal(None::<api::Quote>);

    leptos::task::spawn_local(async move {
        if let Ok(quote) = api::fetch_quote().await {
            set_quote.set(Some(quote));
        }
    });

    view! {
        <Show when=move || quote.get().is_some()>
            <blockquote class="quote-banner">
                <p>{move || quote.get().map(|q| q.text).unwrap_or_default()}</p>
                <cite>{move || quote.get().map(|q| q.author).unwrap_or_default()}</cite>
            </blockquote>
        </Show>
    }
}

/// Login/signup modal. Redirects to the dashboard on success.
#[component]
pub fn AuthModal(show: RwSignal<bool>) -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (signup_mode, set_signup_mode) = signal(false);
    let (error, set_error) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let submit = move |_| {
        if busy.get() {
            return;
        }
        set_busy.set(true);
        set_error.set(None);

        let email = email.get();
        let password = password.get();
        let signup = signup_mode.get();

        leptos::task::spawn_local(async move {
            let result = if signup {
                api::signup(&email, &password).await
            } else {
                api::login(&email, &password).await
            };

            match result {
                Ok(_) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href("/dashboard");
                    }
                }
                Err(e) => {
                    set_error.set(Some(e));
                    set_busy.set(false);
                }
            }
        });
    };

    view! {
        <Show when=move || show.get()>
            <div class="modal-backdrop" on:click=move |_| show.set(false)>
                <div class="modal" on:click=|ev| ev.stop_propagation()>
                    <h2>{move || if signup_mode.get() { "Create account" } else { "Welcome back" }}</h2>

                    <div class="field">
                        <label>"Email"</label>
                        <input
                            type="email"
                            placeholder="you@example.com"
                            prop:value=move || email.get()
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="field">
                        <label>"Password"</label>
                        <input
                            type="password"
                            prop:value=move || password.get()
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                    </div>

                    <Show when=move || error.get().is_some()>
                        <p class="error">{move || error.get().unwrap_or_default()}</p>
                    </Show>

                    <button class="btn btn-primary" on:click=submit disabled=move || busy.get()>
                        {move || if busy.get() { "..." } else if signup_mode.get() { "Sign up" } else { "Sign in" }}
                    </button>

                    <button class="btn-link" on:click=move |_| set_signup_mode.update(|m| *m = !*m)>
                        {move || if signup_mode.get() {
                            "Already have an account? Sign in"
                        } else {
                            "New here? Create an account"
                        }}
                    </button>
                </div>
            </div>
        </Show>
    }
}

/// 10x10 grid of year dots
#[component]
pub fn LifeGridView(grid: api::LifeGrid) -> impl IntoView {
    let age = grid.age;
    let remaining = grid.years_remaining;

    view! {
        <div class="life-grid-wrap">
            <div class="life-grid-age">
                <span class="age">{age}</span>
                <span class="label">"years lived"</span>
            </div>

            <div class="life-grid">
                {grid
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(index, cell)| {
                        let class = format!("cell cell-{cell}");
                        let title = format!("Year {}", index + 1);
                        view! { <div class=class title=title></div> }
                    })
                    .collect_view()}
            </div>

            <p class="life-grid-note">
                {format!("{remaining} years remaining (assuming 100 year lifespan)")}
            </p>
        </div>
    }
}

/// Five-dot rater for one virtue
#[component]
pub fn VirtueRater(name: &'static str, value: RwSignal<u8>) -> impl IntoView {
    view! {
        <div class="virtue">
            <span class="virtue-name">{name}</span>
            <div class="virtue-dots">
                {(1u8..=5)
                    .map(|rating| {
                        view! {
                            <button
                                class=move || {
                                    if value.get() >= rating { "dot dot-filled" } else { "dot" }
                                }
                                on:click=move |_| value.set(rating)
                            ></button>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
