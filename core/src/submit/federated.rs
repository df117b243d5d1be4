// core/src/submit/federated.rs
use crate::error::{Result, SubmitError};
use crate::job::Batch;
use crate::rpc::message::TransportError;
use crate::rpc::{Transport, SUBMIT_PATH};
use crate::submit::response::{interpret, Attempt};
use crate::submit::{Kind, Reporter};
use crate::utils::metrics::Metrics;
use crate::utils::models::Cluster;

pub const SUBMITTED_JOBS_METRIC: &str = "command.submit.jobs";

/// A batch accepted by one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub cluster: Cluster,
    pub uuids: Vec<String>,
}

/// Submits a batch to the first cluster that accepts it.
///
/// Clusters are tried strictly one at a time, in order, and each at most
/// once. A rejection or a connection failure moves on to the next cluster. A
/// read timeout or a broken reply stops everything: the batch may already
/// exist on that cluster and sending it elsewhere could duplicate it.
pub struct FederatedSubmitter<'a, T: Transport> {
    transport: T,
    metrics: &'a dyn Metrics,
    reporter: &'a dyn Reporter,
}

impl<'a, T: Transport> FederatedSubmitter<'a, T> {
    pub fn new(transport: T, metrics: &'a dyn Metrics, reporter: &'a dyn Reporter) -> Self {
        FederatedSubmitter { transport, metrics, reporter }
    }

    pub async fn submit(&self, clusters: &[Cluster], batch: &Batch) -> Result<Submission> {
        if clusters.is_empty() {
            return Err(SubmitError::validation("You must specify at least one cluster."));
        }
        let body = request_body(batch);
        let mut attempted = Vec::with_capacity(clusters.len());

        for cluster in clusters {
            self.reporter.report(Kind::Info, &format!("Attempting to submit on {} cluster...", cluster.name));
            attempted.push(cluster.name.clone());

            match self.attempt(cluster, &body).await {
                Attempt::Succeeded(uuids) => {
                    self.reporter.report(Kind::Success, &succeeded_message(&cluster.name, &uuids));
                    self.metrics.inc(SUBMITTED_JOBS_METRIC, batch.jobs.len());
                    return Ok(Submission { cluster: cluster.clone(), uuids });
                }
                Attempt::Rejected(reason) | Attempt::Unavailable(reason) => {
                    self.reporter.report(Kind::Failure, &failed_message(&cluster.name, &reason));
                }
                Attempt::Ambiguous => {
                    return Err(self.halt(SubmitError::AmbiguousTimeout {
                        cluster: cluster.name.clone(),
                        url: cluster.url.clone(),
                    }));
                }
                Attempt::Interrupted => {
                    return Err(self.halt(SubmitError::InterruptedReply {
                        cluster: cluster.name.clone(),
                        url: cluster.url.clone(),
                    }));
                }
            }
        }

        Err(SubmitError::AllClustersExhausted { clusters: attempted })
    }

    fn halt(&self, err: SubmitError) -> SubmitError {
        self.reporter.report(Kind::Warning, &err.to_string());
        err
    }

    async fn attempt(&self, cluster: &Cluster, body: &serde_json::Value) -> Attempt {
        match self.transport.post(cluster, SUBMIT_PATH, body).await {
            Ok(response) => interpret(&response),
            Err(TransportError::ReadTimeout(e)) => {
                log::error!("Read timeout submitting to {} ({}): {}", cluster.name, cluster.url, e);
                Attempt::Ambiguous
            }
            Err(TransportError::Interrupted(e)) => {
                log::error!("Reply from {} ({}) was interrupted: {}", cluster.name, cluster.url, e);
                Attempt::Interrupted
            }
            Err(TransportError::Connect(e)) => {
                log::error!("Cannot connect to {} ({}): {}", cluster.name, cluster.url, e);
                Attempt::Unavailable(format!("Cannot connect to {} ({})", cluster.name, cluster.url))
            }
        }
    }
}

/// `{"jobs": [...]}`, plus `"groups": [group]` when the batch has a group.
pub fn request_body(batch: &Batch) -> serde_json::Value {
    let mut body = serde_json::json!({ "jobs": batch.jobs });
    if let Some(group) = &batch.group {
        body["groups"] = serde_json::json!([group]);
    }
    body
}

fn succeeded_message(cluster_name: &str, uuids: &[String]) -> String {
    if uuids.len() == 1 {
        format!("Job submission succeeded on {}. Your job UUID is:\n{}", cluster_name, uuids[0])
    } else {
        format!("Job submission succeeded on {}. Your job UUIDs are:\n{}", cluster_name, uuids.join("\n"))
    }
}

fn failed_message(cluster_name: &str, reason: &str) -> String {
    format!("Job submission failed on {}:\n{}", cluster_name, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::models::{Group, Job};
    use crate::utils::value::{Mapping, Value};

    fn job(command: &str) -> Job {
        let mut fields = Mapping::new();
        fields.insert("command".to_string(), Value::str(command));
        Job::new(fields)
    }

    #[test]
    fn test_body_without_group() {
        let batch = Batch { jobs: vec![job("ls")], group: None };
        assert_eq!(request_body(&batch), serde_json::json!({"jobs": [{"command": "ls"}]}));
    }

    #[test]
    fn test_body_with_group() {
        let group = Group { name: "g".to_string(), uuid: "u".to_string() };
        let batch = Batch { jobs: vec![job("ls")], group: Some(group) };
        assert_eq!(
            request_body(&batch),
            serde_json::json!({"jobs": [{"command": "ls"}], "groups": [{"name": "g", "uuid": "u"}]})
        );
    }

    #[test]
    fn test_messages() {
        assert!(succeeded_message("dev", &["a".to_string()]).ends_with("UUID is:\na"));
        assert!(succeeded_message("dev", &["a".to_string(), "b".to_string()]).ends_with("UUIDs are:\na\nb"));
        assert_eq!(failed_message("dev", "nope"), "Job submission failed on dev:\nnope");
    }
}
