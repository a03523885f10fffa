//! Declarative route table and the access gate that decides, before
//! anything renders, whether a navigation target is reachable for the
//! current identity.

mod gate;
mod table;

pub use gate::{decide, landing_path, RouteDecision};
pub use table::{
    find_route, RouteEntry, APP_ROOT, LOGIN_PATH, ONBOARDING_WORKSPACE_PATH, ROOT_PATH, ROUTES,
};

/// What the router does with a path: mount the matched route, or navigate
/// elsewhere first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(&'static RouteEntry),
    Redirect(String),
}

/// Resolve a path against the route table and the gate. Unknown paths fall
/// through to the public landing page, mirroring a catch-all route.
pub fn resolve(path: &str, identity: Option<&crate::session::Identity>) -> Resolution {
    match find_route(path) {
        None => Resolution::Redirect(ROOT_PATH.to_string()),
        Some(entry) => match decide(identity, entry.guard) {
            RouteDecision::Allow => Resolution::Render(entry),
            RouteDecision::Redirect(target) => Resolution::Redirect(target),
        },
    }
}
