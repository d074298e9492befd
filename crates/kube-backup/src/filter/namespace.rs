use crate::config::SelectionSettings;

/// Namespace inclusion and exclusion lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceFilter {
    only: Option<Vec<String>>,
    skip: Vec<String>,
}

impl NamespaceFilter {
    pub fn new(only: Option<Vec<String>>, skip: Vec<String>) -> Self {
        Self { only, skip }
    }

    pub fn from_settings(selection: &SelectionSettings) -> Self {
        Self {
            only: selection.only_namespaces.as_deref().map(split_list),
            skip: selection
                .skip_namespaces
                .as_deref()
                .map(split_list)
                .unwrap_or_default(),
        }
    }

    /// Namespace names are matched exactly; objects without a namespace only
    /// pass when no inclusion list is configured.
    pub fn allows(&self, namespace: Option<&str>) -> bool {
        if let Some(ns) = namespace {
            if self.skip.iter().any(|s| s == ns) {
                return false;
            }
        }

        match &self.only {
            Some(only) => namespace.is_some_and(|ns| only.iter().any(|o| o == ns)),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_none() && self.skip.is_empty()
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lists_allows_everything() {
        let filter = NamespaceFilter::default();
        assert!(filter.is_empty());
        assert!(filter.allows(Some("prod")));
        assert!(filter.allows(None));
    }

    #[test]
    fn test_skip_list() {
        let filter = NamespaceFilter::new(None, vec!["kube-system".to_string()]);
        assert!(!filter.allows(Some("kube-system")));
        assert!(filter.allows(Some("prod")));
    }

    #[test]
    fn test_only_list() {
        let filter = NamespaceFilter::new(Some(vec!["prod".to_string()]), vec![]);
        assert!(filter.allows(Some("prod")));
        assert!(!filter.allows(Some("staging")));
        assert!(!filter.allows(None));
    }

    #[test]
    fn test_skip_checked_before_only() {
        let filter = NamespaceFilter::new(Some(vec!["prod".to_string()]), vec!["prod".to_string()]);
        assert!(!filter.allows(Some("prod")));
    }

    #[test]
    fn test_from_settings_trims_entries() {
        let selection = SelectionSettings {
            only_namespaces: Some(" prod , staging".to_string()),
            skip_namespaces: Some("openshift-monitoring,".to_string()),
            ..Default::default()
        };
        let filter = NamespaceFilter::from_settings(&selection);
        assert!(filter.allows(Some("staging")));
        assert!(!filter.allows(Some("openshift-monitoring")));
        assert!(!filter.allows(Some("dev")));
    }
}
