//! Navigation targets and the guard that decides whether they may render.

use tokio::sync::watch;

use crate::auth::AuthState;

/// A navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    // Public
    Home,
    About,
    Features,
    Benefits,
    Login,
    Register,
    // Protected
    Dashboard,
    Households,
    Usage,
    Billing,
    Payments,
    Tariffs,
    SmsLogs,
    Profile,
}

impl Route {
    pub const ALL: [Self; 14] = [
        Self::Home,
        Self::About,
        Self::Features,
        Self::Benefits,
        Self::Login,
        Self::Register,
        Self::Dashboard,
        Self::Households,
        Self::Usage,
        Self::Billing,
        Self::Payments,
        Self::Tariffs,
        Self::SmsLogs,
        Self::Profile,
    ];

    /// The route's path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::About => "/about",
            Self::Features => "/features",
            Self::Benefits => "/benefits",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Households => "/households",
            Self::Usage => "/usage",
            Self::Billing => "/billing",
            Self::Payments => "/payments",
            Self::Tariffs => "/tariffs",
            Self::SmsLogs => "/sms-logs",
            Self::Profile => "/profile",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::About => "About",
            Self::Features => "Features",
            Self::Benefits => "Benefits",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Dashboard => "Dashboard",
            Self::Households => "Households",
            Self::Usage => "Water Usage",
            Self::Billing => "Billing",
            Self::Payments => "Payments",
            Self::Tariffs => "Tariff Rates",
            Self::SmsLogs => "SMS Logs",
            Self::Profile => "Profile",
        }
    }

    /// Resolve a path. Unknown paths go to [`Route::Home`].
    ///
    /// Query strings, fragments and a trailing slash are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        Self::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Self::Home)
    }

    /// Whether the route renders without a session.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(
            self,
            Self::Home | Self::About | Self::Features | Self::Benefits | Self::Login | Self::Register
        )
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// What to do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the route.
    Render,
    /// The session is still being resolved; show a neutral placeholder.
    Wait,
    /// Send the user to [`Route::Login`].
    RedirectToLogin,
}

/// Gate in front of protected routes.
///
/// Observes the [`AuthState`] published by [`crate::AuthSession`], so it
/// follows logins, logouts and failed token refreshes without being told.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    state: watch::Receiver<AuthState>,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(state: watch::Receiver<AuthState>) -> Self {
        Self { state }
    }

    /// Decide whether `route` may render right now.
    #[must_use]
    pub fn decide(&self, route: Route) -> GuardDecision {
        if route.is_public() {
            return GuardDecision::Render;
        }
        match *self.state.borrow() {
            AuthState::Resolving => GuardDecision::Wait,
            AuthState::Unauthenticated => GuardDecision::RedirectToLogin,
            AuthState::Authenticated(_) => GuardDecision::Render,
        }
    }

    /// Where a navigation to `path` ends up, and what to do there.
    #[must_use]
    pub fn navigate(&self, path: &str) -> (Route, GuardDecision) {
        let route = Route::from_path(path);
        let decision = self.decide(route);
        let target = match decision {
            GuardDecision::RedirectToLogin => Route::Login,
            GuardDecision::Render | GuardDecision::Wait => route,
        };
        tracing::debug!(path, target = %target, ?decision, "Navigation");
        (target, decision)
    }

    /// Whether the navigation bar is shown on `route`.
    #[must_use]
    pub fn show_navbar(&self, route: Route) -> bool {
        !route.is_public() && self.state.borrow().is_authenticated()
    }

    /// Current auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Wait until the session has been resolved.
    ///
    /// Returns [`AuthState::Unauthenticated`] if the session owner is gone.
    pub async fn wait_resolved(&mut self) -> AuthState {
        match self.state.wait_for(|state| !state.is_resolving()).await {
            Ok(state) => state.clone(),
            Err(_) => AuthState::Unauthenticated,
        }
    }
}
