use crate::error::BackupError;
use crate::resource::ResourceRecord;

/// Controllers whose Pods are recreated automatically.
pub const SKIP_POD_OWNERS: &[&str] = &["DaemonSet", "ReplicaSet", "Job", "StatefulSet"];

const SERVICE_ACCOUNT_TOKEN: &str = "kubernetes.io/service-account-token";

/// Why an object was left out of the backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Pod recreated by the named controller kind.
    ControllerOwnedPod(String),
    /// Endpoints maintained by a Service selector.
    ServiceEndpoints,
    /// Token Secret rotated by the service account controller.
    ServiceAccountToken,
    /// Namespace rejected by the namespace filter.
    Namespace,
    /// Matched a user skip pattern.
    Pattern(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ControllerOwnedPod(owner) => write!(f, "pod owned by {}", owner),
            SkipReason::ServiceEndpoints => write!(f, "endpoints managed by service"),
            SkipReason::ServiceAccountToken => write!(f, "service account token"),
            SkipReason::Namespace => write!(f, "namespace filter"),
            SkipReason::Pattern(pattern) => write!(f, "skip pattern '{}'", pattern),
        }
    }
}

/// Decides whether a namespaced object is a byproduct of another object.
///
/// Returns `Ok(None)` when the object should be kept. A Pod with more than
/// one owner reference is reported as an error: every controller this filter
/// knows about sets exactly one.
pub fn check_derived(record: &ResourceRecord) -> Result<Option<SkipReason>, BackupError> {
    match record.kind() {
        "Secret" if record.secret_type() == Some(SERVICE_ACCOUNT_TOKEN) => {
            Ok(Some(SkipReason::ServiceAccountToken))
        }
        "Pod" => check_pod(record),
        "Endpoints" if record.first_endpoint_target_kind() == Some("Pod") => {
            Ok(Some(SkipReason::ServiceEndpoints))
        }
        _ => Ok(None),
    }
}

fn check_pod(record: &ResourceRecord) -> Result<Option<SkipReason>, BackupError> {
    let Some(owners) = record.owner_references() else {
        return Ok(None);
    };

    if owners.len() > 1 {
        return Err(BackupError::Invariant {
            kind: record.kind().to_string(),
            name: record.name().to_string(),
            message: format!("many ownerReferences ({})", owners.len()),
            record: record
                .to_yaml()
                .unwrap_or_else(|e| format!("<unserializable record: {}>", e)),
        });
    }

    Ok(owners
        .first()
        .filter(|owner| SKIP_POD_OWNERS.contains(&owner.kind))
        .map(|owner| SkipReason::ControllerOwnedPod(owner.kind.to_string())))
}
