//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::{DashboardPage, LandingPage, MarcusPage, PricingPage};

/// The three UI states the client gates between
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Anonymous landing
    Landing,
    /// Authenticated but unpaid
    Paywall,
    /// Authenticated and paid
    Dashboard,
}

/// Pure gating function of the two observed booleans
pub fn access(authenticated: bool, paid: bool) -> Access {
    match (authenticated, paid) {
        (false, _) => Access::Landing,
        (true, false) => Access::Paywall,
        (true, true) => Access::Dashboard,
    }
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=LandingPage />
                    <Route path=path!("/dashboard") view=DashboardPage />
                    <Route path=path!("/marcus") view=MarcusPage />
                    <Route path=path!("/pricing") view=PricingPage />
                </Routes>
            </main>
        </Router>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gating_table() {
        assert_eq!(access(false, false), Access::Landing);
        assert_eq!(access(false, true), Access::Landing);
        assert_eq!(access(true, false), Access::Paywall);
        assert_eq!(access(true, true), Access::Dashboard);
    }
}
