use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::collect::ExceptionSet;
use crate::collect::transfer::fetch_file;
use crate::collect::walker::{LOST_AND_FOUND, walk};
use crate::config::{Config, FILES_INDIVIDUAL, TaskDefinition};
use crate::error::Error;
use crate::host_handler::{HostHandler, split_remote_path};
use crate::task::{TaskInterpreter, TaskReport};

/// One target host and the handler used to reach it.
#[derive(Debug)]
pub struct ManagedHost<Handler>
where
    Handler: HostHandler,
{
    host: String,
    endpoint: String,
    pub handler: Handler,
}

impl<Handler: HostHandler> ManagedHost<Handler> {
    /// `host` tags the collected files, `endpoint` is what the handler connects to.
    pub fn new(host: &str, endpoint: &str, handler: Handler) -> ManagedHost<Handler> {
        ManagedHost {
            host: host.to_string(),
            endpoint: endpoint.to_string(),
            handler,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn connect(&mut self) -> Result<(), Error> {
        self.handler.connect(&self.endpoint)?;
        info!("Successfully connected to : {}", self.endpoint);
        Ok(())
    }

    pub fn is_connected(&mut self) -> bool {
        self.handler.is_connected()
    }

    pub fn disconnect(&mut self) -> Result<(), Error> {
        self.handler.disconnect()
    }

    /// Connects, collects files, runs tasks and disconnects.
    pub fn process(&mut self, config: &Config, local_dir: &Path) -> Result<HostReport, Error> {
        let started = Instant::now();

        self.connect()?;

        let files_transferred =
            self.collect_files(&config.getfiles, &config.exceptions(), local_dir)?;
        let task_report = self.run_tasks(&config.executetasks, local_dir)?;

        // Everything is collected by now, a failed goodbye is not worth halting for
        if let Err(error_detail) = self.disconnect() {
            warn!("{} : {}", self.host, error_detail);
        }

        Ok(HostReport {
            host: self.host.clone(),
            files_transferred: files_transferred + task_report.files_transferred,
            tasks_executed: task_report.tasks_executed,
            elapsed: started.elapsed(),
        })
    }

    /// Collects every group in name order. Returns how many files were copied.
    pub fn collect_files(
        &mut self,
        getfiles: &BTreeMap<String, Vec<String>>,
        exceptions: &ExceptionSet,
        local_dir: &Path,
    ) -> Result<u64, Error> {
        if !self.is_connected() {
            return Err(Error::NotConnectedToHost);
        }

        let mut files_transferred: u64 = 0;

        for (group, path_specs) in getfiles {
            info!("running get files: {}", group);

            for path_spec in path_specs {
                let remote_files = if group == FILES_INDIVIDUAL {
                    vec![path_spec.clone()]
                } else {
                    walk(&mut self.handler, path_spec, exceptions)?
                };

                for remote_file in remote_files {
                    if group != FILES_INDIVIDUAL && is_excluded(&remote_file, exceptions) {
                        debug!("skipping {} (exception)", remote_file);
                        continue;
                    }

                    let transfer =
                        fetch_file(&mut self.handler, &remote_file, local_dir, &self.host)?;
                    if transfer.is_completed() {
                        files_transferred += 1;
                    }
                }
            }
        }

        Ok(files_transferred)
    }

    pub fn run_tasks(
        &mut self,
        tasks: &BTreeMap<String, TaskDefinition>,
        local_dir: &Path,
    ) -> Result<TaskReport, Error> {
        if !self.is_connected() {
            return Err(Error::NotConnectedToHost);
        }

        TaskInterpreter::new(&mut self.handler, &self.host, local_dir).run_all(tasks)
    }
}

// Glob matches come back from the walker unfiltered
fn is_excluded(remote_file: &str, exceptions: &ExceptionSet) -> bool {
    exceptions.contains(remote_file) || split_remote_path(remote_file).1 == LOST_AND_FOUND
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostReport {
    pub host: String,
    pub files_transferred: u64,
    pub tasks_executed: u64,
    pub elapsed: Duration,
}
