//! # getlogs
//!
//! Collects log files from a fleet of hosts over SSH/SFTP and runs small task pipelines on them.
//!
//! For every host of the configuration, getlogs :
//! - walks the configured remote directories (or globs) and copies each file under a local,
//!   timestamped directory, prefixing its name with the host so files never collide,
//! - decompresses collected `.xz` archives next to themselves,
//! - runs the configured tasks in name order, each task being a remote command plus what to do
//!   with its output (log it, repeat the next task N times, collect the file it names, fan out
//!   to the machines it lists).
//!
//! # Most basic example : collect /var/log/app from three hosts
//! ```rust
//!use getlogs::prelude::*;
//!
//!fn main() -> Result<(), Error> {
//!    let raw_config = "---
//!remote_ipaddr: 10.20.0.201-203
//!username: collector
//!ssh_key: /home/collector/.ssh/id_ed25519
//!getfiles:
//!  applogs:
//!    - /var/log/app
//!executetasks:
//!  task01:
//!    taskexecute: uptime
//!    taskget: console
//!        ";
//!
//!    let config = Config::from_str(raw_config, ConfigFormat::Yaml)?;
//!    let run_report = Job::new(config, ".").run()?;
//!
//!    println!("{} files collected", run_report.total_files());
//!    Ok(())
//!}
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod exitcode;
pub mod host;
pub mod host_handler;
pub mod job;
pub mod managed_host;
pub mod prelude;
pub mod task;

pub use crate::error::Error;
pub use crate::host_handler::HostHandler;
pub use crate::host_handler::localhost::LocalHostHandler;
pub use crate::host_handler::ssh2::Ssh2HostHandler;
pub use crate::managed_host::ManagedHost;
