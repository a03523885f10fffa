use crate::session::{Identity, Role};
use crate::workspace::Workspace;

use super::table::{APP_ROOT, LOGIN_PATH, ONBOARDING_WORKSPACE_PATH};

/// Outcome of the access check. A redirect is a routing decision, not an
/// error: authentication failures go to the login page, authorization
/// failures to the neutral authenticated landing point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Pure, synchronous reachability check for one route guard against the
/// current identity snapshot. No data is fetched; the router re-invokes this
/// whenever the identity changes, so a logout while a protected view is
/// mounted revokes access on the next resolve.
pub fn decide(identity: Option<&Identity>, guard: Option<&[Role]>) -> RouteDecision {
    let Some(required) = guard else {
        // Public route, no gate.
        return RouteDecision::Allow;
    };
    let Some(identity) = identity else {
        return RouteDecision::Redirect(LOGIN_PATH.to_string());
    };
    if required.is_empty() || required.contains(&identity.role) {
        RouteDecision::Allow
    } else {
        // Authenticated but wrong role: never back to login.
        RouteDecision::Redirect(APP_ROOT.to_string())
    }
}

/// Where the authenticated index sends an identity once session and
/// workspace state are known. Clients explore; owners and professionals go
/// to their active workspace's dashboard. An owner with no workspace yet is
/// in onboarding; a professional with none has nowhere better than the
/// index itself.
pub fn landing_path(identity: &Identity, active: Option<&Workspace>) -> String {
    match identity.role {
        Role::Client => "/app/explore".to_string(),
        Role::Owner => match active {
            Some(ws) => format!("/app/{}/dashboard", ws.id),
            None => ONBOARDING_WORKSPACE_PATH.to_string(),
        },
        Role::Professional => match active {
            Some(ws) => format!("/app/{}/dashboard", ws.id),
            None => APP_ROOT.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: "u-1".into(),
            email: "u@example.com".into(),
            name: "U".into(),
            role,
            avatar: None,
        }
    }

    #[test]
    fn unauthenticated_always_redirects_to_login() {
        const ANY: &[Role] = &[];
        const OWNER: &[Role] = &[Role::Owner];
        for guard in [Some(ANY), Some(OWNER)] {
            assert_eq!(decide(None, guard), RouteDecision::Redirect(LOGIN_PATH.to_string()));
        }
        // Public routes carry no gate at all
        assert_eq!(decide(None, None), RouteDecision::Allow);
    }

    #[test]
    fn wrong_role_redirects_to_app_root_not_login() {
        let client = identity(Role::Client);
        let d = decide(Some(&client), Some(&[Role::Owner]));
        assert_eq!(d, RouteDecision::Redirect(APP_ROOT.to_string()));
    }

    #[test]
    fn member_role_is_allowed() {
        let owner = identity(Role::Owner);
        assert_eq!(decide(Some(&owner), Some(&[Role::Owner, Role::Professional])), RouteDecision::Allow);
        // Empty guard admits any authenticated identity
        assert_eq!(decide(Some(&owner), Some(&[])), RouteDecision::Allow);
    }
}
