//! Anonymous route allow-list and deep-link parsing.

/// Sign-in modal available to anonymous users.
pub const SIGN_IN_MODAL_ROUTE: &str = "sign-in-modal";

/// Entry route after a full sign-out.
pub const SIGN_IN_ROUTE: &str = "sign-in";

const REPORT_ID_PLACEHOLDER: &str = ":reportID";

/// Route templates anonymous users may open.
const ANONYMOUS_ROUTES: [&str; 4] = [
    SIGN_IN_MODAL_ROUTE,
    "r/:reportID/details",
    "r/:reportID/details/shareCode",
    "concierge",
];

/// Returns true if an anonymous session may open `route`.
///
/// A bare report deep link (`r/<id>`) is always allowed. Otherwise the route
/// is normalised (web app prefix removed, report id replaced by
/// `:reportID`, leading `/` stripped) and compared with the allow-list.
pub fn can_access_route_by_anonymous_user(route: &str, web_app_url: &str) -> bool {
    let path = strip_deep_link_prefix(route, web_app_url);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if let ["r", report_id] = segments.as_slice() {
        if is_report_id(report_id) {
            return true;
        }
    }

    let normalized = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            if index == 1 && segments[0] == "r" && is_report_id(segment) {
                REPORT_ID_PLACEHOLDER
            } else {
                *segment
            }
        })
        .collect::<Vec<&str>>()
        .join("/");

    ANONYMOUS_ROUTES.contains(&normalized.as_str())
}

/// Report id encoded in a deep link such as `https://new.tally.app/r/123`.
pub fn report_id_from_url(url: &str, web_app_url: &str) -> Option<String> {
    let path = strip_deep_link_prefix(url, web_app_url);
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some("r"), Some(id)) if is_report_id(id) => Some(id.to_string()),
        _ => None,
    }
}

fn strip_deep_link_prefix<'a>(route: &'a str, web_app_url: &str) -> &'a str {
    let route = route.split(['?', '#']).next().unwrap_or(route);
    let origin = web_app_url.trim_end_matches('/');
    let path = if !origin.is_empty() {
        route.strip_prefix(origin).unwrap_or(route)
    } else {
        route
    };
    path.trim_start_matches('/')
}

fn is_report_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: &str = "https://new.tally.app";

    #[test]
    fn test_report_deep_link_is_allowed() {
        assert!(can_access_route_by_anonymous_user("r/123", WEB));
        assert!(can_access_route_by_anonymous_user("/r/98765", WEB));
        assert!(can_access_route_by_anonymous_user("https://new.tally.app/r/4", WEB));
    }

    #[test]
    fn test_templates_with_report_id_are_allowed() {
        assert!(can_access_route_by_anonymous_user("r/123/details", WEB));
        assert!(can_access_route_by_anonymous_user("/r/123/details/shareCode", WEB));
        assert!(can_access_route_by_anonymous_user("sign-in-modal", WEB));
        assert!(can_access_route_by_anonymous_user("/concierge", WEB));
    }

    #[test]
    fn test_other_routes_are_blocked() {
        assert!(!can_access_route_by_anonymous_user("settings", WEB));
        assert!(!can_access_route_by_anonymous_user("r/123/participants", WEB));
        assert!(!can_access_route_by_anonymous_user("r/abc", WEB));
        assert!(!can_access_route_by_anonymous_user("r/abc/details", WEB));
        assert!(!can_access_route_by_anonymous_user("", WEB));
        assert!(!can_access_route_by_anonymous_user("concierge/extra", WEB));
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert!(can_access_route_by_anonymous_user("r/123/details?referrer=x", WEB));
    }

    #[test]
    fn test_report_id_from_url() {
        assert_eq!(
            report_id_from_url("https://new.tally.app/r/555", WEB),
            Some("555".to_string())
        );
        assert_eq!(
            report_id_from_url("https://new.tally.app/r/555/details", WEB),
            Some("555".to_string())
        );
        assert_eq!(report_id_from_url("https://new.tally.app/settings", WEB), None);
        assert_eq!(report_id_from_url("", WEB), None);
    }
}
