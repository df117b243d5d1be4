// core/src/utils/models.rs
use crate::utils::value::{Mapping, Value};
use serde::{Deserialize, Serialize};

/// A fully assembled job, ready to be posted to a scheduler.
///
/// Jobs stay loosely typed so raw job specs can carry scheduler fields this
/// client knows nothing about; only the fields the client itself manages get
/// accessors.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Job(Mapping);

impl Job {
    pub fn new(fields: Mapping) -> Self {
        Job(fields)
    }

    pub fn uuid(&self) -> Option<&str> {
        self.0.get("uuid").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn command(&self) -> Option<&str> {
        self.0.get("command").and_then(Value::as_str)
    }

    pub fn group(&self) -> Option<&str> {
        self.0.get("group").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Mapping {
        &self.0
    }
}

/// Job group shared by every job of a batch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub name: String,
    pub uuid: String,
}

/// One scheduler endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Cluster {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Cluster { name: name.into(), url: url.into(), disabled: false }
    }

    /// Joins `path` onto the cluster's base url.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
