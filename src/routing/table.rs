use once_cell::sync::Lazy;

use crate::session::Role;

/// Fixed redirect target for unauthenticated access.
pub const LOGIN_PATH: &str = "/login";
/// Neutral authenticated landing point; also the authorization-failure
/// redirect target.
pub const APP_ROOT: &str = "/app";
/// Public landing page and the catch-all redirect target.
pub const ROOT_PATH: &str = "/";
/// First onboarding step for owners without a workspace.
pub const ONBOARDING_WORKSPACE_PATH: &str = "/onboarding/workspace";

/// One route: a path pattern (`:segment` matches any single segment) and its
/// guard. `None` means public; `Some(&[])` means any authenticated identity;
/// a non-empty slice restricts by role. Static, never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub guard: Option<&'static [Role]>,
}

const OWNER: &[Role] = &[Role::Owner];
const OWNER_PROFESSIONAL: &[Role] = &[Role::Owner, Role::Professional];
const CLIENT: &[Role] = &[Role::Client];
const ANY_AUTHENTICATED: &[Role] = &[];

pub static ROUTES: Lazy<Vec<RouteEntry>> = Lazy::new(|| {
    vec![
        // Public
        RouteEntry { path: "/", guard: None },
        RouteEntry { path: "/login", guard: None },
        RouteEntry { path: "/register", guard: None },
        RouteEntry { path: "/forgot-password", guard: None },
        // Onboarding
        RouteEntry { path: "/onboarding/workspace", guard: Some(OWNER) },
        RouteEntry { path: "/onboarding/plan", guard: Some(OWNER) },
        // Authenticated index
        RouteEntry { path: "/app", guard: Some(ANY_AUTHENTICATED) },
        // Owner/professional, workspace-scoped
        RouteEntry { path: "/app/:workspace_id/dashboard", guard: Some(OWNER_PROFESSIONAL) },
        RouteEntry { path: "/app/:workspace_id/professionals", guard: Some(OWNER) },
        RouteEntry { path: "/app/:workspace_id/services", guard: Some(OWNER) },
        RouteEntry { path: "/app/:workspace_id/appointments", guard: Some(OWNER_PROFESSIONAL) },
        RouteEntry { path: "/app/:workspace_id/billing", guard: Some(OWNER) },
        RouteEntry { path: "/app/:workspace_id/settings", guard: Some(OWNER) },
        // Client
        RouteEntry { path: "/app/explore", guard: Some(CLIENT) },
        RouteEntry { path: "/app/my-appointments", guard: Some(CLIENT) },
    ]
});

/// Find the first table entry whose pattern matches `path`, or `None` for
/// unrouted paths (the caller redirects to the landing page).
pub fn find_route(path: &str) -> Option<&'static RouteEntry> {
    ROUTES.iter().find(|r| path_matches(r.path, path))
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let pat: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let got: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if pat.len() != got.len() {
        return false;
    }
    pat.iter().zip(got.iter()).all(|(p, g)| p.starts_with(':') || p == g)
}
