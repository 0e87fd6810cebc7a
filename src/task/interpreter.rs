use crate::collect::transfer::{Transfer, fetch_file, fetch_returned_file};
use crate::config::TaskDefinition;
use crate::error::Error;
use crate::host_handler::{CommandResult, HostHandler};
use crate::task::execute::{ExecuteStep, ITERATE_MARKER, substitute_iteration, vm_command};
use crate::task::get::{GetStep, last_number, returned_path, vm_list};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info, warn};

/// State carried from one task to the next on the same host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpreterState {
    /// Set by an `iterate` get-step, consumed by the next task that runs.
    pub iteration_count: Option<u32>,
    /// Set by a `sshlistvms` get-step. May hold empty entries.
    pub vm_list: Vec<String>,
    /// Output of the last command(s), until a get-step consumes it.
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Remote commands run, fan-out and iterations included.
    pub tasks_executed: u64,
    pub files_transferred: u64,
}

/// Runs the task list of one host.
pub struct TaskInterpreter<'a, Handler: HostHandler + ?Sized> {
    handler: &'a mut Handler,
    host_tag: &'a str,
    local_dir: &'a Path,
    state: InterpreterState,
    report: TaskReport,
}

impl<'a, Handler: HostHandler + ?Sized> TaskInterpreter<'a, Handler> {
    pub fn new(handler: &'a mut Handler, host_tag: &'a str, local_dir: &'a Path) -> Self {
        TaskInterpreter {
            handler,
            host_tag,
            local_dir,
            state: InterpreterState::default(),
            report: TaskReport::default(),
        }
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    pub fn report(&self) -> &TaskReport {
        &self.report
    }

    /// Runs every task in name order and returns what was done. The state is dropped afterwards.
    pub fn run_all(
        mut self,
        tasks: &BTreeMap<String, TaskDefinition>,
    ) -> Result<TaskReport, Error> {
        for (name, task) in tasks {
            self.run_task(name, task)?;
        }
        Ok(self.report)
    }

    pub fn run_task(&mut self, name: &str, task: &TaskDefinition) -> Result<(), Error> {
        info!("running task: {}", name);

        if task.taskexecute.is_empty() {
            info!("task {} has nothing to execute, skipping it", name);
            return Ok(());
        }

        self.execute(name, &task.taskexecute)?;
        self.get(&task.taskget)
    }

    fn execute(&mut self, name: &str, template: &str) -> Result<(), Error> {
        info!("taskexecute: {}", template);

        if let Some(iteration_count) = self.state.iteration_count.take() {
            if !template.contains(ITERATE_MARKER) {
                return Err(Error::MissingIterateMarker {
                    task: name.to_string(),
                });
            }

            for iteration in 1..=iteration_count {
                let command = substitute_iteration(template, iteration);
                info!("cmd {}", command);
                let result = self.run_checked(&command)?;
                info!("\n{}", result.stdout);
                self.state.payload.clear();
            }
            return Ok(());
        }

        match ExecuteStep::parse(template) {
            ExecuteStep::FanOut(sub_commands) => self.fan_out(&sub_commands),
            ExecuteStep::Command(command) => {
                let result = self.run_checked(command)?;
                self.state.payload.push_str(&result.stdout);
            }
        }

        Ok(())
    }

    // One failing machine must not stop the others
    fn fan_out(&mut self, sub_commands: &[&str]) {
        info!("sshlistvms: {:?}", self.state.vm_list);

        let vms: Vec<String> = self
            .state
            .vm_list
            .iter()
            .filter(|vm| !vm.is_empty())
            .cloned()
            .collect();

        for vm in &vms {
            info!("vm: {}", vm);
            for sub_command in sub_commands {
                let command = vm_command(vm, sub_command);
                info!("cmd: {}", command);
                self.report.tasks_executed += 1;

                match self.handler.run_command(&command) {
                    Ok(result) if result.return_code == 0 => {
                        info!("\n{}", result.stdout);
                    }
                    Ok(result) => {
                        warn!(
                            "`{}` exited with return code {}\n{}{}",
                            command, result.return_code, result.stdout, result.stderr
                        );
                    }
                    Err(error_detail) => {
                        error!("failed to run `{}` : {}", command, error_detail);
                    }
                }
                self.state.payload.clear();
            }
        }
    }

    fn run_checked(&mut self, command: &str) -> Result<CommandResult, Error> {
        self.report.tasks_executed += 1;

        let result = self.handler.run_command(command)?;
        if result.return_code != 0 {
            error!(
                "`{}` exited with return code {}\n{}{}",
                command, result.return_code, result.stdout, result.stderr
            );
            return Err(Error::CommandFailed {
                command: command.to_string(),
                return_code: result.return_code,
            });
        }

        Ok(result)
    }

    fn get(&mut self, taskget: &str) -> Result<(), Error> {
        info!("taskget: {}", taskget);
        let payload = std::mem::take(&mut self.state.payload);

        match GetStep::from(taskget) {
            GetStep::Console => {
                info!("\n{}", payload);
            }
            GetStep::Discard => {}
            GetStep::Iterate => {
                let iteration_count = last_number(&payload)?;
                info!("iterate times: {}", iteration_count);
                self.state.iteration_count = Some(iteration_count);
            }
            GetStep::Return => {
                let remote_path = returned_path(&payload);
                info!("return filename: {}", remote_path);

                if remote_path.is_empty() {
                    warn!("command returned no file name");
                } else {
                    let transfer = fetch_returned_file(&mut *self.handler, &remote_path, self.local_dir)?;
                    self.count(&transfer);
                }
            }
            GetStep::SshListVms => {
                self.state.vm_list = vm_list(&payload);
            }
            GetStep::Fetch(remote_path) => {
                let transfer =
                    fetch_file(&mut *self.handler, &remote_path, self.local_dir, self.host_tag)?;
                self.count(&transfer);
            }
        }

        Ok(())
    }

    fn count(&mut self, transfer: &Transfer) {
        if transfer.is_completed() {
            self.report.files_transferred += 1;
        }
    }
}
