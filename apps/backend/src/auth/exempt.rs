//! Routes that must stay reachable without a valid access token.

use std::collections::HashSet;

/// Path of the token refresh endpoint, exempt by default.
pub const REFRESH_TOKEN_ROUTE: &str = "/api/auth/refresh-token";

/// Route identifiers registered as "no authentication required".
///
/// Identifiers are actix resource patterns (`/api/users/{id}`) or literal
/// paths. A trailing `/` is ignored on both sides of the lookup.
#[derive(Debug, Clone, Default)]
pub struct ExemptRoutes {
    routes: HashSet<String>,
}

impl ExemptRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in set: only the refresh endpoint.
    pub fn with_defaults() -> Self {
        Self::new().allow(REFRESH_TOKEN_ROUTE)
    }

    pub fn allow(mut self, route: &str) -> Self {
        self.insert(route);
        self
    }

    pub fn insert(&mut self, route: &str) {
        let route = normalize(route);
        if !route.is_empty() {
            self.routes.insert(route.to_string());
        }
    }

    pub fn allow_all<'a>(mut self, routes: impl IntoIterator<Item = &'a str>) -> Self {
        for route in routes {
            self.insert(route);
        }
        self
    }

    pub fn is_exempt(&self, route: &str) -> bool {
        self.routes.contains(normalize(route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn normalize(route: &str) -> &str {
    let route = route.trim();
    if route.len() > 1 {
        route.trim_end_matches('/')
    } else {
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_exempt_refresh_only() {
        let routes = ExemptRoutes::with_defaults();
        assert!(routes.is_exempt("/api/auth/refresh-token"));
        assert!(!routes.is_exempt("/api/auth/login"));
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let routes = ExemptRoutes::new().allow("/api/public/");
        assert!(routes.is_exempt("/api/public"));
        assert!(routes.is_exempt("/api/public/"));
    }

    #[test]
    fn test_patterns_match_literally() {
        let routes = ExemptRoutes::new().allow("/api/products/{id}");
        assert!(routes.is_exempt("/api/products/{id}"));
        assert!(!routes.is_exempt("/api/products/42"));
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let routes = ExemptRoutes::new().allow_all(["", "  ", "/"]);
        assert_eq!(routes.len(), 1);
        assert!(routes.is_exempt("/"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let routes = ExemptRoutes::with_defaults();
        assert!(!routes.is_exempt("/API/auth/refresh-token"));
    }
}
