//! Pricing Page

use leptos::prelude::*;

use crate::api;

#[component]
pub fn PricingPage() -> impl IntoView {
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
        <div class="pricing">
            <h1>"Pricing"</h1>
            <p class="subtitle">"One practice, two ways to keep it"</p>

            <Show when=move || error.get().is_some()>
                <p class="error">{move || error.get().unwrap_or_default()}</p>
            </Show>

            <div class="plans">
                <div class="plan">
                    <h2>"Monthly"</h2>
                    <div class="price">"£9"<span>"/month"</span></div>
                    <ul>
                        <li>"Unlimited conversations with Marcus"</li>
                        <li>"Virtue tracker and journal"</li>
                        <li>"Memento mori grid"</li>
                        <li>"Cancel any time"</li>
                    </ul>
                    <button class="btn btn-primary" on:click=move |_| checkout("monthly")>
                        "Subscribe"
                    </button>
                </div>

                <div class="plan featured">
                    <span class="badge">"Best value"</span>
                    <h2>"Lifetime"</h2>
                    <div class="price">"£49"<span>" once"</span></div>
                    <ul>
                        <li>"Everything in monthly"</li>
                        <li>"Pay once, keep it forever"</li>
                        <li>"No renewal to remember"</li>
                    </ul>
                    <button class="btn" on:click=move |_| checkout("lifetime")>
                        "Buy Lifetime"
                    </button>
                </div>
            </div>

            <p class="pricing-note">
                "Checkout requires an account. " <a href="/">"Sign in first"</a>
            </p>
        </div>
    }
}
