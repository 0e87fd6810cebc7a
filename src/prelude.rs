pub use crate::collect::ExceptionSet;
pub use crate::collect::transfer::{Transfer, fetch_file, fetch_returned_file, post_process};
pub use crate::collect::walker::walk;
pub use crate::config::{Config, ConfigFormat, TaskDefinition};
pub use crate::error::Error;
pub use crate::host::expand_host_spec;
pub use crate::host_handler::HostHandler;
pub use crate::host_handler::localhost::LocalHostHandler;
pub use crate::host_handler::ssh2::{Ssh2AuthMethod, Ssh2HostHandler};
pub use crate::job::{Job, RunReport};
pub use crate::managed_host::{HostReport, ManagedHost};
pub use crate::task::{InterpreterState, TaskInterpreter, TaskReport};
