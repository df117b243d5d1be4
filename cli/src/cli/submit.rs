use crate::cli::output::ConsoleReporter;
use anyhow::Result;
use cook_core::job::JobAssembler;
use cook_core::rpc::HttpTransport;
use cook_core::submit::FederatedSubmitter;
use cook_core::utils::config::{submit_declared_defaults, Settings};
use cook_core::utils::metrics;
use cook_core::utils::models::Cluster;
use cook_core::utils::value::{Mapping, Value};
use std::io;
use structopt::{clap::AppSettings, StructOpt};
use uuid::Uuid;

#[derive(StructOpt, Debug)]
#[structopt(setting = AppSettings::TrailingVarArg)]
pub struct SubmitCommand {
    /// uuid of job
    #[structopt(short, long, parse(try_from_str = valid_uuid))]
    uuid: Option<String>,

    /// name of job
    #[structopt(short, long)]
    name: Option<String>,

    /// priority of job, between 0 and 100 (inclusive), with 100 being highest priority (default = 50)
    #[structopt(short, long, parse(try_from_str = valid_priority))]
    priority: Option<i64>,

    /// maximum retries for job
    #[structopt(long = "max-retries", value_name = "COUNT")]
    max_retries: Option<i64>,

    /// maximum runtime for job
    #[structopt(long = "max-runtime", value_name = "MILLIS")]
    max_runtime: Option<i64>,

    /// cpus to reserve for job
    #[structopt(short, long)]
    cpus: Option<f64>,

    /// memory to reserve for job
    #[structopt(short, long)]
    mem: Option<i64>,

    /// group uuid for job
    #[structopt(short, long, value_name = "UUID")]
    group: Option<String>,

    /// group name for job
    #[structopt(short = "G", long = "group-name", value_name = "NAME")]
    group_name: Option<String>,

    /// environment variable for job (can be repeated)
    #[structopt(short, long, value_name = "KEY=VALUE", number_of_values = 1)]
    env: Vec<String>,

    /// number of ports to reserve for job
    #[structopt(long)]
    ports: Option<i64>,

    /// name of application submitting the job
    #[structopt(short = "a", long = "application-name")]
    application_name: Option<String>,

    /// version of application submitting the job
    #[structopt(short = "v", long = "application-version")]
    application_version: Option<String>,

    /// executor to use to run the job on the Mesos agent
    #[structopt(short = "E", long, possible_values = &["cook", "mesos"])]
    executor: Option<String>,

    /// raw job spec in json format
    #[structopt(short, long)]
    raw: bool,

    /// prefix to use for all commands
    #[structopt(long = "command-prefix")]
    command_prefix: Option<String>,

    /// command to run (read from stdin, one per line, when omitted)
    #[structopt(name = "COMMAND", allow_hyphen_values = true)]
    command: Vec<String>,
}

impl SubmitCommand {
    pub async fn execute(self, settings: &Settings, clusters: &[Cluster], reporter: &ConsoleReporter) -> Result<()> {
        if clusters.is_empty() {
            anyhow::bail!("You must specify at least one cluster.");
        }
        let options = settings.option_values("submit", &submit_declared_defaults(), &self.explicit_options());

        let batch = JobAssembler::new(options).assemble(io::stdin().lock(), &mut reporter.prompt_sink(io::stderr()))?;

        let transport = HttpTransport::new(&settings.http)?;
        let metrics = metrics::from_settings(&settings.metrics);
        let submission = FederatedSubmitter::new(transport, metrics.as_ref(), reporter)
            .submit(clusters, &batch)
            .await?;

        if reporter.is_silent() {
            println!("{}", submission.uuids.join("\n"));
        }
        Ok(())
    }

    /// Options given on the command line, keyed by their long names.
    fn explicit_options(&self) -> Mapping {
        let mut options = Mapping::new();
        let mut set = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                options.insert(key.to_string(), value);
            }
        };

        set("uuid", self.uuid.clone().map(Value::from));
        set("name", self.name.clone().map(Value::from));
        set("priority", self.priority.map(Value::from));
        set("max-retries", self.max_retries.map(Value::from));
        set("max-runtime", self.max_runtime.map(Value::from));
        set("cpus", self.cpus.map(Value::from));
        set("mem", self.mem.map(Value::from));
        set("group", self.group.clone().map(Value::from));
        set("group-name", self.group_name.clone().map(Value::from));
        set("ports", self.ports.map(Value::from));
        set("application-name", self.application_name.clone().map(Value::from));
        set("application-version", self.application_version.clone().map(Value::from));
        set("executor", self.executor.clone().map(Value::from));
        set("command-prefix", self.command_prefix.clone().map(Value::from));
        set("raw", self.raw.then_some(Value::from(true)));
        set("env", strings(&self.env));
        set("command", strings(&self.command));
        options
    }
}

fn strings(items: &[String]) -> Option<Value> {
    if items.is_empty() {
        None
    } else {
        Some(Value::Sequence(items.iter().map(|s| Value::str(s.as_str())).collect()))
    }
}

fn valid_uuid(s: &str) -> Result<String, String> {
    Uuid::parse_str(s)
        .map(|u| u.hyphenated().to_string())
        .map_err(|_| format!("{} is not a valid UUID", s))
}

fn valid_priority(s: &str) -> Result<i64, String> {
    match s.parse::<i64>() {
        Ok(p) if (0..=100).contains(&p) => Ok(p),
        _ => Err(format!("invalid choice: {} (choose from 0 to 100)", s)),
    }
}
