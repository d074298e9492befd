//! Resolution of the resource kinds to capture.

use crate::config::SelectionSettings;

/// Cluster-scoped kinds captured by default.
pub const GLOBAL_TYPES: &[&str] = &[
    "node",
    "apiservice",
    "clusterrole",
    "clusterrolebinding",
    "podsecuritypolicy",
    "storageclass",
    "persistentvolume",
    "customresourcedefinition",
    "mutatingwebhookconfiguration",
    "validatingwebhookconfiguration",
    "priorityclass",
    "project",
];

/// Namespaced Kubernetes kinds captured by default.
pub const K8S_TYPES: &[&str] = &[
    "serviceaccount",
    "secret",
    "deployment",
    "daemonset",
    "statefulset",
    "configmap",
    "cronjob",
    "ingress",
    "networkpolicy",
    "persistentvolumeclaim",
    "rolebinding",
    "service",
    "pod",
    "endpoints",
    "resourcequota",
    "horizontalpodautoscaler",
];

/// Namespaced OpenShift kinds captured by default.
pub const OPENSHIFT_TYPES: &[&str] = &[
    "buildconfig",
    "deploymentconfig",
    "imagestream",
    "route",
    "template",
];

/// Whether a kind lives inside a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Namespaced,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Namespaced => write!(f, "namespaced"),
        }
    }
}

/// The effective kinds for one run, split by scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet {
    pub global: Vec<String>,
    pub namespaced: Vec<String>,
}

impl TypeSet {
    pub fn from_settings(selection: &SelectionSettings) -> Self {
        let namespaced_defaults: Vec<&str> = K8S_TYPES
            .iter()
            .chain(OPENSHIFT_TYPES.iter())
            .copied()
            .collect();

        Self {
            global: combine_types(
                GLOBAL_TYPES,
                selection.global_resources.as_deref(),
                selection.extra_global_resources.as_deref(),
                selection.skip_global_resources.as_deref(),
            ),
            namespaced: combine_types(
                &namespaced_defaults,
                selection.resources.as_deref(),
                selection.extra_resources.as_deref(),
                selection.skip_resources.as_deref(),
            ),
        }
    }

    pub fn global_is_default(&self) -> bool {
        self.global.iter().map(String::as_str).eq(GLOBAL_TYPES.iter().copied())
    }

    pub fn namespaced_is_default(&self) -> bool {
        self.namespaced
            .iter()
            .map(String::as_str)
            .eq(K8S_TYPES.iter().chain(OPENSHIFT_TYPES.iter()).copied())
    }
}

/// Splits a comma-separated list into trimmed, lower-cased, non-empty items.
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Combines the default kinds with the user overrides.
///
/// `only` replaces everything else. Otherwise `extras` are appended to the
/// defaults and `exclude` is removed, keeping the original order.
pub fn combine_types(
    defaults: &[&str],
    only: Option<&str>,
    extras: Option<&str>,
    exclude: Option<&str>,
) -> Vec<String> {
    if let Some(only) = only {
        return dedup(parse_list(only));
    }

    let mut types: Vec<String> = defaults.iter().map(|t| t.to_lowercase()).collect();

    if let Some(extras) = extras {
        types.extend(parse_list(extras));
    }

    if let Some(exclude) = exclude {
        let exclude = parse_list(exclude);
        types.retain(|t| !exclude.contains(t));
    }

    dedup(types)
}

fn dedup(types: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    types.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_overrides() {
        let types = combine_types(GLOBAL_TYPES, None, None, None);
        assert_eq!(types.len(), GLOBAL_TYPES.len());
        assert_eq!(types[0], "node");
    }

    #[test]
    fn test_only_wins_over_extra_and_exclude() {
        let types = combine_types(
            &["pod", "secret"],
            Some(" Deployment, ConfigMap "),
            Some("route"),
            Some("deployment"),
        );
        assert_eq!(types, vec!["deployment", "configmap"]);
    }

    #[test]
    fn test_extra_then_exclude_preserves_order() {
        let types = combine_types(
            &["pod", "secret", "service"],
            None,
            Some("Route, ImageStream"),
            Some("secret"),
        );
        assert_eq!(types, vec!["pod", "service", "route", "imagestream"]);
    }

    #[test]
    fn test_exclude_absent_entry_is_noop() {
        let types = combine_types(&["pod"], None, None, Some("nonexistent"));
        assert_eq!(types, vec!["pod"]);
    }

    #[test]
    fn test_extras_deduplicated() {
        let types = combine_types(&["pod", "secret"], None, Some("POD,route,route"), None);
        assert_eq!(types, vec!["pod", "secret", "route"]);
    }

    #[test]
    fn test_parse_list_drops_empty_items() {
        assert_eq!(parse_list("a,, b ,"), vec!["a", "b"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_type_set_from_settings() {
        let selection = SelectionSettings {
            skip_resources: Some("pod,endpoints".to_string()),
            global_resources: Some("node".to_string()),
            ..Default::default()
        };
        let set = TypeSet::from_settings(&selection);

        assert_eq!(set.global, vec!["node"]);
        assert!(!set.global_is_default());
        assert!(!set.namespaced.contains(&"pod".to_string()));
        assert!(set.namespaced.contains(&"route".to_string()));
        assert!(!set.namespaced_is_default());
    }

    #[test]
    fn test_type_set_default_detection() {
        let set = TypeSet::from_settings(&SelectionSettings::default());
        assert!(set.global_is_default());
        assert!(set.namespaced_is_default());
        assert_eq!(set.namespaced.len(), K8S_TYPES.len() + OPENSHIFT_TYPES.len());
    }
}
