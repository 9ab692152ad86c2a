//! The navigation guard.
//!
//! Evaluated once per navigation attempt, against the session state at
//! that moment. The guard never errors: a disallowed navigation is
//! substituted with an allowed one.

use tracing::debug;

use crate::auth::SessionReader;

use super::routes::{Route, LANDING};

/// Resolve a requested destination against the current session.
///
/// - Entry routes to Login or the authenticated landing page
/// - a protected destination without a session is substituted with Login
/// - everything else proceeds as requested
pub fn resolve(requested: Route, authenticated: bool) -> Route {
    match requested {
        Route::Entry => {
            if authenticated {
                LANDING
            } else {
                Route::Login
            }
        }
        route if route.requires_auth() && !authenticated => {
            debug!(requested = route.path(), "Unauthenticated, redirecting to login");
            Route::Login
        }
        route => route,
    }
}

/// `resolve` against a live session handle.
pub fn resolve_with(requested: Route, session: &SessionReader) -> Route {
    resolve(requested, session.is_authenticated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;

    #[test]
    fn test_protected_route_requires_session() {
        assert_eq!(resolve(Route::Collection, false), Route::Login);
        assert_eq!(resolve(Route::Decks, false), Route::Login);

        assert_eq!(resolve(Route::Collection, true), Route::Collection);
        assert_eq!(resolve(Route::Decks, true), Route::Decks);
    }

    #[test]
    fn test_open_routes_always_proceed() {
        for authenticated in [false, true] {
            assert_eq!(resolve(Route::Login, authenticated), Route::Login);
            assert_eq!(resolve(Route::Register, authenticated), Route::Register);
        }
    }

    #[test]
    fn test_entry_is_a_pure_router() {
        assert_eq!(resolve(Route::Entry, false), Route::Login);
        assert_eq!(resolve(Route::Entry, true), LANDING);
    }

    #[test]
    fn test_resolve_follows_session_state() {
        let store = SessionStore::in_memory();
        let reader = store.reader();

        assert_eq!(resolve_with(Route::Collection, &reader), Route::Login);

        store.set_token(Some("tok".to_string()));
        assert_eq!(resolve_with(Route::Collection, &reader), Route::Collection);
        assert_eq!(resolve_with(Route::Entry, &reader), LANDING);

        // Re-evaluated on every attempt: a cleared session redirects again
        store.clear();
        assert_eq!(resolve_with(Route::Collection, &reader), Route::Login);
    }
}
