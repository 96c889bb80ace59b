#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Auth,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Auth => "/auth",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Page name as written in `<body data-page="...">`.
    pub fn from_page_name(name: &str) -> Option<Self> {
        match name {
            "landing" | "index" => Some(Route::Landing),
            "auth" => Some(Route::Auth),
            "dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }
}

pub trait Navigator {
    fn navigate(&self, route: Route);
}
