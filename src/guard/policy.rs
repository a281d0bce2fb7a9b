use crate::config::RoutePolicyConfig;
use crate::models::Role;

/// Role restrictions keyed by path prefix.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<(String, Vec<Role>)>,
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(routes: &[RoutePolicyConfig]) -> Self {
        routes
            .iter()
            .fold(Self::new(), |policy, r| policy.restrict(&r.prefix, r.roles.clone()))
    }

    /// Limits `prefix` and everything below it to `roles`.
    pub fn restrict(mut self, prefix: &str, roles: Vec<Role>) -> Self {
        let prefix = normalize(prefix);
        self.rules.retain(|(p, _)| *p != prefix);
        self.rules.push((prefix, roles));
        self
    }

    /// The roles required for `path`; the longest matching prefix wins.
    /// `None` means any signed-in user may enter.
    pub fn required_roles(&self, path: &str) -> Option<&[Role]> {
        let path = normalize(path);
        self.rules
            .iter()
            .filter(|(prefix, _)| covers(prefix, &path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, roles)| roles.as_slice())
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// Matches whole segments only: "/dashboard/users" covers "/dashboard/users/42"
// but not "/dashboard/usersettings".
fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
