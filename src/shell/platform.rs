//! Platform detection.

/// Environment variables set by common CI providers.
const CI_MARKERS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
];

/// Check if running in a CI environment, where nobody answers prompts.
pub fn is_ci() -> bool {
    ci_marker(|name| std::env::var_os(name).is_some()).is_some()
}

fn ci_marker(is_set: impl Fn(&str) -> bool) -> Option<&'static str> {
    CI_MARKERS.iter().copied().find(|name| is_set(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_any_marker() {
        assert_eq!(ci_marker(|name| name == "GITLAB_CI"), Some("GITLAB_CI"));
        assert_eq!(ci_marker(|_| false), None);
    }
}
