//! Removal of server-assigned and time-varying fields.
//!
//! Re-capturing an unchanged object must produce byte-identical output, so
//! everything the API server rewrites on its own is dropped before writing.

use serde_json::{Map, Value};

use super::record::ResourceRecord;

/// Metadata fields assigned by the API server.
const VOLATILE_METADATA: &[&str] = &[
    "creationTimestamp",
    "selfLink",
    "uid",
    "resourceVersion",
    "generation",
];

/// Annotations that controllers and `kubectl apply` keep rewriting.
const VOLATILE_ANNOTATIONS: &[&str] = &[
    "kubectl.kubernetes.io/last-applied-configuration",
    "control-plane.alpha.kubernetes.io/leader",
    "deployment.kubernetes.io/revision",
];

/// Returns the record without status, server metadata, controller
/// annotations and dynamically allocated Service cluster IPs.
///
/// Idempotent: `sanitize(sanitize(r)) == sanitize(r)`.
pub fn sanitize(record: ResourceRecord) -> ResourceRecord {
    let mut record = record;
    let is_service = record.kind() == "Service";
    let fields = record.fields_mut();

    fields.shift_remove("status");

    if let Some(Value::Object(metadata)) = fields.get_mut("metadata") {
        clean_metadata(metadata);
        if metadata.is_empty() {
            fields.shift_remove("metadata");
        }
    }

    if is_service {
        if let Some(Value::Object(spec)) = fields.get_mut("spec") {
            if spec.get("clusterIP").and_then(Value::as_str) != Some("None") {
                spec.shift_remove("clusterIP");
            }
            if spec.is_empty() {
                fields.shift_remove("spec");
            }
        }
    }

    record
}

fn clean_metadata(metadata: &mut Map<String, Value>) {
    for key in VOLATILE_METADATA {
        metadata.shift_remove(*key);
    }

    if let Some(Value::Object(annotations)) = metadata.get_mut("annotations") {
        for key in VOLATILE_ANNOTATIONS {
            annotations.shift_remove(*key);
        }
        if annotations.is_empty() {
            metadata.shift_remove("annotations");
        }
    }

    if metadata.get("namespace").and_then(Value::as_str) == Some("") {
        metadata.shift_remove("namespace");
    }
}
