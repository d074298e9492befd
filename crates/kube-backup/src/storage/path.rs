use std::path::PathBuf;

use crate::resource::ResourceRecord;
use crate::selection::Scope;

/// Directory holding cluster-scoped objects.
pub const GLOBAL_DIR: &str = "_global_";

/// Relative location of a sanitized object inside the backup tree:
/// `_global_/<Kind>/<name>.yaml` or `<namespace>/<Kind>/<name>.yaml`.
/// A cluster-scoped object listed as a namespaced type has no namespace and
/// lands in `<Kind>/<name>.yaml`.
pub fn resource_path(record: &ResourceRecord, scope: Scope) -> PathBuf {
    let file = format!("{}.yaml", record.name());
    let dir = match scope {
        Scope::Global => Some(GLOBAL_DIR),
        Scope::Namespaced => record.namespace(),
    };

    let path = match dir {
        Some(dir) => format!("{}/{}/{}", dir, record.kind(), file),
        None => format!("{}/{}", record.kind(), file),
    };
    PathBuf::from(escape_path(&path))
}

/// Colons are not allowed in file names on some file systems.
pub fn escape_path(path: &str) -> String {
    path.replace(':', "_")
}
