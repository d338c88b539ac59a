//! Landing Page

use leptos::prelude::*;

use crate::components::{AuthModal, QuoteBanner};

#[component]
pub fn LandingPage() -> impl IntoView {
    let show_auth = RwSignal::new(false);

    view! {
        <div class="landing">
            <header class="hero">
                <h1>"Memento"</h1>
                <p class="tagline">"Stoic tools for a deliberate life"</p>
                <div class="cta">
                    <button class="btn btn-primary" on:click=move |_| show_auth.set(true)>
                        "Begin"
                    </button>
                    <a href="/pricing" class="btn">"View Plans"</a>
                </div>
            </header>

            <QuoteBanner />

            <section class="features">
                <div class="feature">
                    <h3>"🏛 MarcusGPT"</h3>
                    <p>"Counsel from Marcus Aurelius, in his own voice. Ask anything."</p>
                </div>
                <div class="feature">
                    <h3>"⚖ Virtue Tracker"</h3>
                    <p>"Rate yourself daily on courage, wisdom, justice and temperance."</p>
                </div>
                <div class="feature">
                    <h3>"📜 Journal"</h3>
                    <p>"An evening review in the tradition of the Meditations."</p>
                </div>
                <div class="feature">
                    <h3>"⏳ Memento Mori"</h3>
                    <p>"Your life in a hundred dots. One of them is this year."</p>
                </div>
            </section>

            <AuthModal show=show_auth />
        </div>
    }
}
