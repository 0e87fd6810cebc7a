//! A run over every configured host.

use crate::config::Config;
use crate::error::Error;
use crate::host::expand_host_spec;
use crate::host_handler::ssh2::Ssh2HostHandler;
use crate::managed_host::{HostReport, ManagedHost};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Format of the per-run output directory name.
pub const OUTPUT_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct Job {
    config: Config,
    output_root: PathBuf,
}

impl Job {
    pub fn new(config: Config, output_root: impl Into<PathBuf>) -> Job {
        Job {
            config,
            output_root: output_root.into(),
        }
    }

    /// Hosts to visit, in configuration order, trimmed. Empty tokens are left out.
    pub fn hosts(&self) -> Vec<String> {
        expand_host_spec(&self.config.remote_ipaddr)
            .iter()
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect()
    }

    /// Creates `<output_root>/YYYYMMDD_HHMMSS`.
    pub fn create_output_dir(&self) -> Result<PathBuf, Error> {
        let dir_name = chrono::Local::now().format(OUTPUT_DIR_FORMAT).to_string();
        let output_dir = self.output_root.join(dir_name);

        std::fs::create_dir_all(&output_dir)
            .map_err(|error_detail| Error::local_io(&output_dir, error_detail))?;

        Ok(output_dir)
    }

    /// Processes every host, one after the other. The first error halts the run.
    pub fn run(&self) -> Result<RunReport, Error> {
        let started = Instant::now();
        let output_dir = self.create_output_dir()?;
        let mut host_reports: Vec<HostReport> = Vec::new();

        for host in self.hosts() {
            info!("get from addr : {}", host);

            let mut managed_host = ManagedHost::new(
                &host,
                &self.config.endpoint(&host),
                Ssh2HostHandler::from(self.config.auth_method()),
            );
            let host_report = managed_host.process(&self.config, &output_dir)?;

            info!("............................");
            info!("{} took {:?}", host_report.host, host_report.elapsed);
            info!("total files: {}", host_report.files_transferred);
            info!("total tasks: {}", host_report.tasks_executed);

            host_reports.push(host_report);
        }

        let run_report = RunReport {
            output_dir,
            hosts: host_reports,
            elapsed: started.elapsed(),
        };
        run_report.log_summary();

        Ok(run_report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub hosts: Vec<HostReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_files(&self) -> u64 {
        self.hosts.iter().map(|host| host.files_transferred).sum()
    }

    pub fn total_tasks(&self) -> u64 {
        self.hosts.iter().map(|host| host.tasks_executed).sum()
    }

    pub fn log_summary(&self) {
        info!("............................");
        info!("Execution took {:?}", self.elapsed);
        info!("hosts: {}", self.hosts.len());
        info!("total files: {}", self.total_files());
        info!("total tasks: {}", self.total_tasks());
        info!("output directory: {}", self.output_dir.display());
    }
}
