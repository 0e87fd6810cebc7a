use crate::error::Error;
use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9]+").unwrap());

/// What the get phase of a task does with the command output.
#[derive(Debug, Clone, PartialEq)]
pub enum GetStep {
    /// `console` : log the output.
    Console,
    /// `none` : drop the output.
    Discard,
    /// `iterate` : the last number of the output is how many times the next task runs.
    Iterate,
    /// `return` : the output is the path of a file to collect.
    Return,
    /// `sshlistvms` : the output is the machine list, one per line.
    SshListVms,
    /// Anything else is the literal path of a file to collect.
    Fetch(String),
}

impl From<&str> for GetStep {
    fn from(taskget: &str) -> Self {
        match taskget {
            "console" => GetStep::Console,
            "none" => GetStep::Discard,
            "iterate" => GetStep::Iterate,
            "return" => GetStep::Return,
            "sshlistvms" => GetStep::SshListVms,
            path => GetStep::Fetch(path.to_string()),
        }
    }
}

/// Last run of decimal digits found in `payload`.
pub fn last_number(payload: &str) -> Result<u32, Error> {
    let last_match = DIGIT_RUN
        .find_iter(payload)
        .last()
        .ok_or_else(|| Error::NoIterationCountFound(payload.to_string()))?;

    last_match.as_str().parse::<u32>().map_err(|error_detail| {
        Error::FailureToParseContent(format!(
            "iteration count {} : {}",
            last_match.as_str(),
            error_detail
        ))
    })
}

/// Remote path printed by a command : blanks removed, then one trailing newline.
pub fn returned_path(payload: &str) -> String {
    let stripped = remove_blanks(payload);
    match stripped.strip_suffix('\n') {
        Some(path) => path.to_string(),
        None => stripped,
    }
}

/// Machine list printed by a command, one per line. Empty lines are kept, consumers skip them.
pub fn vm_list(payload: &str) -> Vec<String> {
    remove_blanks(payload)
        .split('\n')
        .map(str::to_string)
        .collect()
}

fn remove_blanks(payload: &str) -> String {
    payload
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\r'))
        .collect()
}
