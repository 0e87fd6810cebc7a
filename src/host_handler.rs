pub mod credentials;
pub mod localhost;
pub mod ssh2;

use crate::error::Error;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::debug;

/// Everything the collection engine needs from a host : run commands and read files.
///
/// One handler owns one connection. File operations go through a file-transfer sub-session
/// that implementations may open lazily.
pub trait HostHandler {
    fn connect(&mut self, endpoint: &str) -> Result<(), Error>;

    fn is_connected(&mut self) -> bool;

    fn disconnect(&mut self) -> Result<(), Error>;

    /// Runs `command` in a fresh shell session and waits for it to finish.
    fn run_command(&mut self, command: &str) -> Result<CommandResult, Error>;

    /// Lists `path`, without `.` and `..`. Fails with `Error::FailedRemoteListing` when the
    /// path can't be listed.
    fn read_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>, Error>;

    /// Opens `path` read-only. Fails with `Error::FailedRemoteOpen` when the file can't be
    /// opened.
    fn open_file(&mut self, path: &str) -> Result<Box<dyn Read + '_>, Error>;

    /// Resolves a shell-style pattern (`*`, `?`, `[...]`) segment by segment.
    ///
    /// Directories that can't be listed along the way simply produce no match.
    fn glob(&mut self, pattern: &str) -> Result<Vec<String>, Error> {
        let pattern = pattern.replace('\\', "/");
        let mut candidates: Vec<String> = if pattern.starts_with('/') {
            vec![String::from("/")]
        } else {
            vec![String::new()]
        };
        let mut wildcard_seen = false;

        for segment in pattern.split('/').filter(|segment| !segment.is_empty()) {
            let is_wildcard = segment.contains(['*', '?', '[']);

            // Literal prefix : nothing to check yet, a missing directory shows up when listing it
            if !is_wildcard && !wildcard_seen {
                candidates = candidates
                    .iter()
                    .map(|candidate| join_remote_path(candidate, segment))
                    .collect();
                continue;
            }
            wildcard_seen = true;

            let matcher = Pattern::new(segment).map_err(|error_detail| {
                Error::FailureToParseContent(format!("glob {} : {}", pattern, error_detail))
            })?;

            let mut matches: Vec<String> = Vec::new();
            for candidate in &candidates {
                let directory = if candidate.is_empty() { "." } else { candidate.as_str() };
                let entries = match self.read_dir(directory) {
                    Ok(entries) => entries,
                    Err(error_detail) if error_detail.is_recoverable() => {
                        debug!("glob {} : {}", pattern, error_detail);
                        continue;
                    }
                    Err(error_detail) => return Err(error_detail),
                };

                let mut names: Vec<String> = entries
                    .into_iter()
                    .map(|entry| entry.name)
                    .filter(|name| {
                        if is_wildcard {
                            matcher.matches(name)
                        } else {
                            name == segment
                        }
                    })
                    .collect();
                names.sort();

                matches.extend(names.iter().map(|name| join_remote_path(candidate, name)));
            }
            candidates = matches;
        }

        Ok(candidates)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Joins a remote directory and an entry name with forward slashes, whatever the local platform.
pub fn join_remote_path(directory: &str, name: &str) -> String {
    let directory = directory.replace('\\', "/");
    let trimmed = directory.trim_end_matches('/');

    if trimmed.is_empty() {
        if directory.starts_with('/') {
            format!("/{}", name)
        } else {
            name.to_string()
        }
    } else {
        format!("{}/{}", trimmed, name)
    }
}

/// Splits a remote path into its directory and base name. The directory is empty for a bare
/// file name.
pub fn split_remote_path(path: &str) -> (&str, &str) {
    let path = path.trim_end_matches('/');
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_paths_are_joined_with_forward_slashes() {
        assert_eq!(join_remote_path("a/", "1.log"), "a/1.log");
        assert_eq!(join_remote_path("a", "1.log"), "a/1.log");
        assert_eq!(join_remote_path("/", "var"), "/var");
        assert_eq!(join_remote_path("", "x.log"), "x.log");
        assert_eq!(join_remote_path("C:\\logs\\", "x.log"), "C:/logs/x.log");
    }

    #[test]
    fn remote_paths_are_split() {
        assert_eq!(split_remote_path("/var/log/x.log"), ("/var/log", "x.log"));
        assert_eq!(split_remote_path("/x.log"), ("/", "x.log"));
        assert_eq!(split_remote_path("x.log"), ("", "x.log"));
    }
}
