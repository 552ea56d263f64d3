use parking_lot::RwLock;
use std::fmt;
use tracing::info;

/// Pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    Dashboard,
    Users,
    CreateUser,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/",
            Route::Dashboard => "/dashboard",
            Route::Users => "/users",
            Route::CreateUser => "/users/create",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::SignIn),
            "/dashboard" => Some(Route::Dashboard),
            "/users" => Some(Route::Users),
            "/users/create" => Some(Route::CreateUser),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where flows send the user after they finish.
pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
}

/// In-memory history stack, starting at the sign-in page.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: RwLock<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::starting_at(Route::SignIn)
    }

    pub fn starting_at(route: Route) -> Self {
        Self {
            history: RwLock::new(vec![route]),
        }
    }

    pub fn current(&self) -> Route {
        self.history
            .read()
            .last()
            .copied()
            .unwrap_or(Route::SignIn)
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.read().clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, route: Route) {
        info!("Navigating to {}", route);
        self.history.write().push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_round_trip() {
        for route in [Route::SignIn, Route::Dashboard, Route::Users, Route::CreateUser] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/users/"), Some(Route::Users));
        assert_eq!(Route::from_path("/settings"), None);
    }

    #[test]
    fn test_history_navigator() {
        let navigator = HistoryNavigator::new();
        assert_eq!(navigator.current(), Route::SignIn);

        navigator.push(Route::Dashboard);
        navigator.push(Route::Users);

        assert_eq!(navigator.current(), Route::Users);
        assert_eq!(
            navigator.history(),
            vec![Route::SignIn, Route::Dashboard, Route::Users]
        );
    }
}
