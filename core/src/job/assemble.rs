// core/src/job/assemble.rs
use crate::error::{Result, SubmitError};
use crate::job::command::{CommandSource, Resolved};
use crate::utils::models::{Group, Job};
use crate::utils::value::{merge, Mapping, Scalar, Value};
use crate::utils::{DEFAULT_APPLICATION_NAME, DEFAULT_APPLICATION_VERSION};
use std::collections::HashSet;
use std::io::{BufRead, Write};
use uuid::Uuid;

/// Jobs (and their optional group) ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub jobs: Vec<Job>,
    pub group: Option<Group>,
}

/// Turns the submit configuration into a batch of jobs.
///
/// The configuration maps option names (`cpus`, `max-retries`, `group-name`,
/// ...) to values, defaults included. Keys that only steer assembly are
/// consumed here; everything else ends up on each job as-is.
pub struct JobAssembler {
    config: Mapping,
    user: String,
}

/// Template-only settings pulled out of the configuration.
struct Template {
    fields: Mapping,
    source: CommandSource,
    command_prefix: String,
    group: Option<Group>,
}

impl JobAssembler {
    pub fn new(config: Mapping) -> Self {
        JobAssembler { config, user: whoami::username() }
    }

    /// Overrides the user name used for default job names.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Assembles the batch. `input` is only read in interactive and raw mode;
    /// prompts are written to `prompt`.
    pub fn assemble<R: BufRead, W: Write>(&self, input: R, prompt: &mut W) -> Result<Batch> {
        log::debug!("submit args: {:?}", self.config);
        let template = self.template()?;

        let uuid_given = template.fields.get("uuid").is_some_and(Value::is_truthy);
        let mut jobs: Vec<Mapping> = match template.source.resolve(input, prompt)? {
            Resolved::RawJobs(overrides) => overrides.iter().map(|o| merge(&template.fields, o)).collect(),
            Resolved::Commands(commands) => commands
                .into_iter()
                .map(|c| {
                    let mut job = template.fields.clone();
                    job.insert("command".to_string(), Value::from(c));
                    job
                })
                .collect(),
        };

        if uuid_given && jobs.len() > 1 {
            return Err(SubmitError::validation(
                "You cannot specify multiple subcommands with a single UUID.",
            ));
        }

        for job in jobs.iter_mut() {
            self.finish(job, &template.command_prefix)?;
        }
        let jobs: Vec<Job> = jobs.into_iter().map(Job::new).collect();
        check_unique_uuids(&jobs)?;

        log::debug!("jobs: {:?}", jobs);
        Ok(Batch { jobs, group: template.group })
    }

    fn template(&self) -> Result<Template> {
        let mut fields = self.config.clone();

        let raw = fields.remove("raw").is_some_and(|v| v.is_truthy());
        let tokens = command_tokens(fields.remove("command"))?;
        let command_prefix = fields
            .remove("command-prefix")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let application_name = fields
            .remove("application-name")
            .unwrap_or_else(|| Value::str(DEFAULT_APPLICATION_NAME));
        let application_version = fields
            .remove("application-version")
            .unwrap_or_else(|| Value::str(DEFAULT_APPLICATION_VERSION));
        let mut application = Mapping::new();
        application.insert("name".to_string(), application_name);
        application.insert("version".to_string(), application_version);
        fields.insert("application".to_string(), Value::Mapping(application));

        if let Some(env) = fields.remove("env") {
            fields.insert("env".to_string(), env_mapping(env)?);
        }

        let group = match fields.remove("group-name") {
            Some(name) => {
                let uuid = match fields.get("group").and_then(Value::as_str) {
                    Some(uuid) if !uuid.is_empty() => uuid.to_string(),
                    _ => Uuid::new_v4().to_string(),
                };
                fields.insert("group".to_string(), Value::str(uuid.clone()));
                let name = name.as_str().map(str::to_string).unwrap_or_default();
                Some(Group { name, uuid })
            }
            None => None,
        };

        let source = CommandSource::select(raw, tokens)?;
        Ok(Template { fields, source, command_prefix, group })
    }

    fn finish(&self, job: &mut Mapping, command_prefix: &str) -> Result<()> {
        if !job.get("uuid").is_some_and(Value::is_truthy) {
            job.insert("uuid".to_string(), Value::str(Uuid::new_v4().to_string()));
        }
        if !job.get("name").is_some_and(Value::is_truthy) {
            job.insert("name".to_string(), Value::str(format!("{}_job", self.user)));
        }

        let command = match job.get("command").and_then(Value::as_str) {
            Some(command) if !command.is_empty() => command.to_string(),
            _ => {
                let uuid = job.get("uuid").and_then(Value::as_str).unwrap_or_default();
                return Err(SubmitError::validation(format!("Job {} has no command.", uuid)));
            }
        };
        if !command_prefix.is_empty() {
            job.insert("command".to_string(), Value::str(format!("{}{}", command_prefix, command)));
        }
        Ok(())
    }
}

fn command_tokens(command: Option<Value>) -> Result<Vec<String>> {
    let not_strings = || SubmitError::validation("Command tokens must be strings.");
    match command {
        None | Some(Value::Scalar(Scalar::Null)) => Ok(Vec::new()),
        Some(Value::Scalar(Scalar::Str(command))) if command.is_empty() => Ok(Vec::new()),
        Some(Value::Scalar(Scalar::Str(command))) => Ok(vec![command]),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(not_strings))
            .collect(),
        Some(_) => Err(not_strings()),
    }
}

/// `["A=1", "B=x=y"]` becomes `{"A": "1", "B": "x=y"}`; mappings pass through.
fn env_mapping(env: Value) -> Result<Value> {
    match env {
        Value::Sequence(entries) => {
            let mut vars = Mapping::new();
            for entry in entries {
                let entry = entry
                    .as_str()
                    .ok_or_else(|| SubmitError::validation("Environment entries must be KEY=VALUE strings."))?;
                let (key, value) = entry.split_once('=').ok_or_else(|| {
                    SubmitError::validation(format!("Invalid environment entry '{}', expected KEY=VALUE.", entry))
                })?;
                vars.insert(key.to_string(), Value::str(value));
            }
            Ok(Value::Mapping(vars))
        }
        other => Ok(other),
    }
}

fn check_unique_uuids(jobs: &[Job]) -> Result<()> {
    let mut seen = HashSet::new();
    for uuid in jobs.iter().filter_map(Job::uuid) {
        if !seen.insert(uuid) {
            return Err(SubmitError::validation(format!("Duplicate job UUID {} in submission.", uuid)));
        }
    }
    Ok(())
}
