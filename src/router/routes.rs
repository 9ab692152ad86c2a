//! The navigable destinations of the app.

/// A destination. Each carries one policy attribute: whether it requires
/// an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The root destination. Never rendered - always resolves to Login or
    /// the authenticated landing route.
    Entry,
    Login,
    Register,
    Collection,
    Decks,
}

/// Where an authenticated user lands when no specific destination was
/// requested.
pub const LANDING: Route = Route::Collection;

impl Route {
    /// Get the display title for this route.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Entry => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Collection => "Collection",
            Route::Decks => "Decks",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Entry => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Collection => "/collection",
            Route::Decks => "/decks",
        }
    }

    /// Whether this destination is reachable only with an active session.
    pub fn requires_auth(&self) -> bool {
        match self {
            Route::Entry | Route::Login | Route::Register => false,
            Route::Collection | Route::Decks => true,
        }
    }

    /// Parse a destination from its path, for "go <path>" style input.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Entry),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/collection" => Some(Route::Collection),
            "/decks" => Some(Route::Decks),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_auth_policy() {
        assert!(!Route::Entry.requires_auth());
        assert!(!Route::Login.requires_auth());
        assert!(!Route::Register.requires_auth());
        assert!(Route::Collection.requires_auth());
        assert!(Route::Decks.requires_auth());
    }

    #[test]
    fn test_from_path_round_trip() {
        for route in [
            Route::Entry,
            Route::Login,
            Route::Register,
            Route::Collection,
            Route::Decks,
        ] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_from_path_accepts_trailing_slash() {
        assert_eq!(Route::from_path("/collection/"), Some(Route::Collection));
        assert_eq!(Route::from_path("/"), Some(Route::Entry));
    }

    #[test]
    fn test_from_path_rejects_unknown() {
        assert_eq!(Route::from_path("/cards"), None);
        assert_eq!(Route::from_path("collection"), None);
    }
}
