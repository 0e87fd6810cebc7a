//! Errors raised while collecting from hosts.
//!
//! Every error that reaches the caller of [`crate::job::Job::run`] halts the run. The few
//! recoverable situations are handled where they happen and never surface as an `Err` :
//!
//! | Situation                                             | Outcome                          |
//! |-------------------------------------------------------|----------------------------------|
//! | Configuration unreadable or malformed                 | `FailedInitialization`, fatal    |
//! | TCP connect / handshake / authentication              | `FailedTcpBinding` or `FailedInitialization`, fatal |
//! | SFTP sub-session cannot be opened                     | `FailureToEstablishConnection`, fatal |
//! | Remote listing or glob fails                          | logged, branch yields no entries |
//! | Remote file cannot be opened or read                  | logged, transfer skipped         |
//! | Local directory or file cannot be created             | `FailedLocalIo`, fatal           |
//! | `.xz` decompression fails                             | `FailedDecompression`, fatal     |
//! | Single or iterated command fails                      | `FailureToRunCommand` / `CommandFailed`, fatal |
//! | Command fails inside a `sshlistvms:` fan-out          | logged, fan-out continues        |
//! | `iterate` get-step finds no number                    | `NoIterationCountFound`, fatal   |
//! | Pending iteration but no `iterate` marker in template | `MissingIterateMarker`, fatal    |

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("initialization failed : {0}")]
    FailedInitialization(String),

    #[error("unable to reach host : {0}")]
    FailedTcpBinding(String),

    #[error("failed to establish connection : {0}")]
    FailureToEstablishConnection(String),

    #[error("not connected to host")]
    NotConnectedToHost,

    #[error("failed to run command : {0}")]
    FailureToRunCommand(String),

    #[error("command `{command}` exited with return code {return_code}")]
    CommandFailed { command: String, return_code: i32 },

    #[error("failed to list remote path {path} : {details}")]
    FailedRemoteListing { path: String, details: String },

    #[error("failed to open remote file {path} : {details}")]
    FailedRemoteOpen { path: String, details: String },

    #[error("local filesystem error on {path} : {source}")]
    FailedLocalIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress {path} : {details}")]
    FailedDecompression { path: String, details: String },

    #[error("no iteration count found in command output {0:?}")]
    NoIterationCountFound(String),

    #[error("task {task} has a pending iteration but its command has no `iterate` marker")]
    MissingIterateMarker { task: String },

    #[error("failure to parse content : {0}")]
    FailureToParseContent(String),

    #[error("{0}")]
    AnyOtherError(String),
}

impl Error {
    /// Remote-side failures that only concern one path. They are logged and the walk or the
    /// transfer carries on without that path.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::FailedRemoteListing { .. } | Error::FailedRemoteOpen { .. }
        )
    }

    pub(crate) fn local_io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Error {
        Error::FailedLocalIo {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
