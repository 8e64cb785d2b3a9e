//! Navigable routes and the access rule the session gate applies to them.
//!
//! Every route except `/login` needs a signed-in user. While the initial session fetch is
//! running, protected routes render nothing rather than flashing the login screen.

use crate::session::SessionState;
use std::fmt;

/// A screen the user can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/login`
    Login,
    /// `/`
    Dashboard,
    /// `/budget-editor` for a new budget, `/budget-editor/:id` for an existing one
    BudgetEditor {
        /// Budget to open, if any
        budget_id: Option<i64>,
    },
    /// `/price-database`
    PriceDatabase,
    /// `/reports`
    Reports,
}

/// What to do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Show the route
    Render,
    /// Session still loading; show nothing yet
    Pending,
    /// Go somewhere else instead
    Redirect(Route),
}

impl Route {
    /// Parses a path such as `/budget-editor/42`. Query strings and a trailing slash are
    /// ignored. Returns None for unknown paths.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Some(Self::Dashboard),
            "/login" => Some(Self::Login),
            "/budget-editor" => Some(Self::BudgetEditor { budget_id: None }),
            "/price-database" => Some(Self::PriceDatabase),
            "/reports" => Some(Self::Reports),
            other => other
                .strip_prefix("/budget-editor/")
                .and_then(|id| id.parse::<i64>().ok())
                .map(|id| Self::BudgetEditor {
                    budget_id: Some(id),
                }),
        }
    }

    /// Whether the route needs a signed-in user.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("/login"),
            Self::Dashboard => f.write_str("/"),
            Self::BudgetEditor { budget_id: None } => f.write_str("/budget-editor"),
            Self::BudgetEditor {
                budget_id: Some(id),
            } => write!(f, "/budget-editor/{id}"),
            Self::PriceDatabase => f.write_str("/price-database"),
            Self::Reports => f.write_str("/reports"),
        }
    }
}

/// Decides how `route` is handled given the current session state.
#[must_use]
pub fn resolve_access(state: &SessionState, route: &Route) -> Access {
    let signed_in = state.session.is_some();

    if !route.is_protected() {
        return if signed_in {
            Access::Redirect(Route::Dashboard)
        } else {
            Access::Render
        };
    }

    match (state.loading, signed_in) {
        (_, true) => Access::Render,
        (true, false) => Access::Pending,
        (false, false) => Access::Redirect(Route::Login),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::signed_in_state;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(
            Route::parse("/budget-editor"),
            Some(Route::BudgetEditor { budget_id: None })
        );
        assert_eq!(
            Route::parse("/budget-editor/42/"),
            Some(Route::BudgetEditor {
                budget_id: Some(42)
            })
        );
        assert_eq!(Route::parse("/price-database?q=x"), Some(Route::PriceDatabase));
        assert_eq!(Route::parse("/reports"), Some(Route::Reports));
    }

    #[test]
    fn test_parse_unknown_paths() {
        assert_eq!(Route::parse("/budget-editor/abc"), None);
        assert_eq!(Route::parse("/soccer"), None);
        assert_eq!(Route::parse("reports"), None);
    }

    #[test]
    fn test_display_round_trips() {
        for path in ["/", "/login", "/budget-editor", "/budget-editor/7", "/reports"] {
            assert_eq!(Route::parse(path).map(|r| r.to_string()).as_deref(), Some(path));
        }
    }

    #[test]
    fn test_protected_routes_redirect_when_signed_out() {
        let signed_out = SessionState {
            session: None,
            loading: false,
        };
        assert_eq!(
            resolve_access(&signed_out, &Route::BudgetEditor { budget_id: None }),
            Access::Redirect(Route::Login)
        );
        assert_eq!(
            resolve_access(&signed_out, &Route::Reports),
            Access::Redirect(Route::Login)
        );
        assert_eq!(resolve_access(&signed_out, &Route::Login), Access::Render);
    }

    #[test]
    fn test_protected_routes_wait_while_loading() {
        let loading = SessionState::default();
        assert_eq!(resolve_access(&loading, &Route::Dashboard), Access::Pending);
        assert_eq!(resolve_access(&loading, &Route::Login), Access::Render);
    }

    #[test]
    fn test_signed_in_user() {
        let state = signed_in_state();
        assert_eq!(resolve_access(&state, &Route::PriceDatabase), Access::Render);
        assert_eq!(
            resolve_access(&state, &Route::Login),
            Access::Redirect(Route::Dashboard)
        );
    }
}
