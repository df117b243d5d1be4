// core/src/job/command.rs
use crate::error::{Result, SubmitError};
use crate::utils::value::{Mapping, Value};
use std::io::{BufRead, Read, Write};

const COMMANDS_PROMPT: &str = "Enter the commands, one per line (press Ctrl+D on a blank line to submit)";
const RAW_JOBS_PROMPT: &str = "Enter the raw job(s) JSON (press Ctrl+D on a blank line to submit)";

/// Where the commands of a submission come from. Picked once per invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandSource {
    /// Tokens given on the command line.
    Explicit(Vec<String>),
    /// One command per line on stdin.
    Interactive,
    /// A JSON job spec (or list of them) on stdin.
    Raw,
}

/// What a [`CommandSource`] resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Commands(Vec<String>),
    RawJobs(Vec<Mapping>),
}

impl CommandSource {
    pub fn select(raw: bool, tokens: Vec<String>) -> Result<Self> {
        match (raw, tokens.is_empty()) {
            (true, false) => Err(SubmitError::validation(
                "You cannot specify a command at the command line when using --raw/-r.",
            )),
            (true, true) => Ok(CommandSource::Raw),
            (false, false) => Ok(CommandSource::Explicit(tokens)),
            (false, true) => Ok(CommandSource::Interactive),
        }
    }

    /// Resolves the source, reading from `input` for the stdin-backed modes.
    /// Prompts go to `prompt` so they never mix with job output.
    pub fn resolve<R: BufRead, W: Write>(self, input: R, prompt: &mut W) -> Result<Resolved> {
        match self {
            CommandSource::Explicit(tokens) => {
                let command = join_tokens(tokens)?;
                log::info!("commands: {:?}", [&command]);
                Ok(Resolved::Commands(vec![command]))
            }
            CommandSource::Interactive => {
                let _ = writeln!(prompt, "{}", COMMANDS_PROMPT);
                let commands = read_commands(input)?;
                log::info!("commands: {:?}", commands);
                Ok(Resolved::Commands(commands))
            }
            CommandSource::Raw => {
                let _ = writeln!(prompt, "{}", RAW_JOBS_PROMPT);
                let mut payload = String::new();
                let mut input = input;
                input
                    .read_to_string(&mut payload)
                    .map_err(|e| SubmitError::validation(format!("Failed to read raw job(s) from stdin: {}", e)))?;
                parse_raw_jobs(&payload).map(Resolved::RawJobs)
            }
        }
    }
}

/// A single token is taken verbatim; several are shell-quoted and joined,
/// after dropping one leading `--` separator.
fn join_tokens(tokens: Vec<String>) -> Result<String> {
    if tokens.len() == 1 {
        return Ok(tokens.into_iter().next().unwrap_or_default());
    }
    let tokens = match tokens.first().map(String::as_str) {
        Some("--") => &tokens[1..],
        _ => &tokens[..],
    };
    let quoted = tokens
        .iter()
        .map(|t| shlex::try_quote(t).map(|q| q.into_owned()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SubmitError::validation(format!("Cannot quote command: {}", e)))?;
    Ok(quoted.join(" "))
}

fn read_commands<R: BufRead>(input: R) -> Result<Vec<String>> {
    let mut commands = Vec::new();
    for line in input.lines() {
        let line = line.map_err(|e| SubmitError::validation(format!("Failed to read commands from stdin: {}", e)))?;
        let line = line.trim();
        if !line.is_empty() {
            commands.push(line.to_string());
        }
    }
    if commands.is_empty() {
        return Err(SubmitError::validation("You must specify at least one command."));
    }
    Ok(commands)
}

/// Parses a raw job spec: a single JSON object or a list of objects.
pub fn parse_raw_jobs(payload: &str) -> Result<Vec<Mapping>> {
    let malformed = || SubmitError::validation("malformed JSON for raw job");
    let parsed: serde_json::Value = serde_json::from_str(payload).map_err(|_| malformed())?;
    let jobs = match Value::from(parsed) {
        Value::Mapping(job) => vec![job],
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(job) => Ok(job),
                _ => Err(malformed()),
            })
            .collect::<Result<Vec<_>>>()?,
        Value::Scalar(_) => return Err(malformed()),
    };
    if jobs.is_empty() {
        return Err(SubmitError::validation("You must specify at least one job."));
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(source: CommandSource, stdin: &str) -> Result<Resolved> {
        source.resolve(Cursor::new(stdin.to_string()), &mut Vec::new())
    }

    #[test]
    fn test_select_modes() {
        assert_eq!(CommandSource::select(false, tokens(&["ls"])).unwrap(), CommandSource::Explicit(tokens(&["ls"])));
        assert_eq!(CommandSource::select(false, vec![]).unwrap(), CommandSource::Interactive);
        assert_eq!(CommandSource::select(true, vec![]).unwrap(), CommandSource::Raw);
        assert!(matches!(
            CommandSource::select(true, tokens(&["ls"])),
            Err(SubmitError::Validation(_))
        ));
    }

    #[test]
    fn test_single_token_used_verbatim() {
        let resolved = resolve(CommandSource::Explicit(tokens(&["echo 'hi there'"])), "").unwrap();
        assert_eq!(resolved, Resolved::Commands(vec!["echo 'hi there'".to_string()]));
    }

    #[test]
    fn test_multiple_tokens_are_quoted_and_joined() {
        let resolved = resolve(CommandSource::Explicit(tokens(&["--", "echo", "a b", "$HOME"])), "").unwrap();
        let Resolved::Commands(commands) = resolved else { panic!("expected commands") };
        assert_eq!(commands.len(), 1);
        assert!(commands[0].starts_with("echo "));
        assert_eq!(shlex::split(&commands[0]).unwrap(), tokens(&["echo", "a b", "$HOME"]));
    }

    #[test]
    fn test_plain_tokens_join_with_single_spaces() {
        let resolved = resolve(CommandSource::Explicit(tokens(&["sleep", "10"])), "").unwrap();
        assert_eq!(resolved, Resolved::Commands(vec!["sleep 10".to_string()]));
    }

    #[test]
    fn test_interactive_skips_blank_lines() {
        let resolved = resolve(CommandSource::Interactive, "ls\n\n  \necho hi\n").unwrap();
        assert_eq!(resolved, Resolved::Commands(tokens(&["ls", "echo hi"])));
    }

    #[test]
    fn test_interactive_requires_a_command() {
        let err = resolve(CommandSource::Interactive, "\n\n").unwrap_err();
        assert_eq!(err.to_string(), "You must specify at least one command.");
    }

    #[test]
    fn test_interactive_prompts_on_given_writer() {
        let mut prompt = Vec::new();
        CommandSource::Interactive.resolve(Cursor::new("ls\n"), &mut prompt).unwrap();
        assert!(String::from_utf8(prompt).unwrap().contains("one per line"));
    }

    #[test]
    fn test_raw_object_and_list() {
        assert_eq!(parse_raw_jobs(r#"{"cpus": 2}"#).unwrap().len(), 1);
        assert_eq!(parse_raw_jobs(r#"[{"cpus": 1}, {"cpus": 2}]"#).unwrap().len(), 2);
    }

    #[test]
    fn test_raw_rejects_other_shapes() {
        for payload in [r#""5""#, "5", "[1, 2]", "{not json", "[{\"cpus\": 1}, 3]"] {
            let err = parse_raw_jobs(payload).unwrap_err();
            assert_eq!(err.to_string(), "malformed JSON for raw job", "payload: {}", payload);
        }
    }

    #[test]
    fn test_raw_rejects_empty_list() {
        assert!(matches!(parse_raw_jobs("[]"), Err(SubmitError::Validation(_))));
    }
}
