use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One captured cluster object.
///
/// The object is kept as an ordered key-value tree so that fields this crate
/// knows nothing about are written back exactly as the cluster returned them.
/// The accessors below cover the fields the selection rules look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRecord(Map<String, Value>);

/// A back-reference from an object to the controller that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerReference<'a> {
    pub kind: &'a str,
    pub name: &'a str,
}

impl ResourceRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns `None` unless the value is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn kind(&self) -> &str {
        self.str_field(&["kind"]).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.str_field(&["metadata", "name"]).unwrap_or("")
    }

    /// The namespace, treating an empty string as absent.
    pub fn namespace(&self) -> Option<&str> {
        self.str_field(&["metadata", "namespace"])
            .filter(|ns| !ns.is_empty())
    }

    /// `None` when the object carries no `ownerReferences` at all.
    pub fn owner_references(&self) -> Option<Vec<OwnerReference<'_>>> {
        let refs = self.path(&["metadata", "ownerReferences"])?.as_array()?;
        Some(
            refs.iter()
                .map(|r| OwnerReference {
                    kind: r.get("kind").and_then(Value::as_str).unwrap_or(""),
                    name: r.get("name").and_then(Value::as_str).unwrap_or(""),
                })
                .collect(),
        )
    }

    /// The `type` field of a Secret.
    pub fn secret_type(&self) -> Option<&str> {
        self.str_field(&["type"])
    }

    /// Kind of the object behind the first address of the first Endpoints
    /// subset. Ready addresses are used when present, not-ready ones otherwise.
    pub fn first_endpoint_target_kind(&self) -> Option<&str> {
        let subset = self.get("subsets")?.as_array()?.first()?;
        let addresses = subset
            .get("addresses")
            .or_else(|| subset.get("notReadyAddresses"))?
            .as_array()?;
        addresses
            .first()?
            .get("targetRef")?
            .get("kind")?
            .as_str()
    }

    /// Short `<ns>/<kind>/<name>` label for log lines.
    pub fn display_id(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}/{}", ns, self.kind(), self.name()),
            None => format!("{}/{}", self.kind(), self.name()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    fn path(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        Some(current)
    }

    fn str_field(&self, keys: &[&str]) -> Option<&str> {
        self.path(keys)?.as_str()
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }
}

impl From<ResourceRecord> for Value {
    fn from(record: ResourceRecord) -> Self {
        record.into_value()
    }
}
