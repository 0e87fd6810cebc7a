use crate::error::Error;
use crate::host_handler::{CommandResult, HostHandler, RemoteEntry};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs the collection against the local machine.
///
/// Remote paths are resolved under `root`, commands run through `sh -c` with `root` as working
/// directory.
#[derive(Debug, Clone)]
pub struct LocalHostHandler {
    root: PathBuf,
}

impl LocalHostHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl HostHandler for LocalHostHandler {
    fn connect(&mut self, _endpoint: &str) -> Result<(), Error> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::FailedInitialization(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }

    fn is_connected(&mut self) -> bool {
        true
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn run_command(&mut self, command: &str) -> Result<CommandResult, Error> {
        let result = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.root)
            .output();

        match result {
            Ok(output) => Ok(CommandResult {
                // Killed by a signal : no code
                return_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Err(e) => Err(Error::FailureToRunCommand(format!("{}", e))),
        }
    }

    fn read_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>, Error> {
        let listing_error = |details: std::io::Error| Error::FailedRemoteListing {
            path: path.to_string(),
            details: details.to_string(),
        };

        let mut entries: Vec<RemoteEntry> = Vec::new();
        for entry in std::fs::read_dir(self.resolve(path)).map_err(listing_error)? {
            let entry = entry.map_err(listing_error)?;
            let file_type = entry.file_type().map_err(listing_error)?;
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: file_type.is_dir(),
            });
        }

        Ok(entries)
    }

    fn open_file(&mut self, path: &str) -> Result<Box<dyn Read + '_>, Error> {
        let resolved = self.resolve(path);
        if resolved.is_dir() {
            return Err(Error::FailedRemoteOpen {
                path: path.to_string(),
                details: String::from("is a directory"),
            });
        }

        match File::open(&resolved) {
            Ok(file) => Ok(Box::new(file)),
            Err(error_detail) => Err(Error::FailedRemoteOpen {
                path: path.to_string(),
                details: error_detail.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_run_from_the_root_directory() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("marker.txt"), "here").unwrap();
        let mut handler = LocalHostHandler::new(root.path());

        let result = handler.run_command("cat marker.txt; exit 4").unwrap();

        assert_eq!(result.stdout, "here");
        assert_eq!(result.return_code, 4);
    }

    #[test]
    fn absolute_paths_are_resolved_under_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("var/log")).unwrap();
        std::fs::write(root.path().join("var/log/syslog"), "boot").unwrap();
        let mut handler = LocalHostHandler::new(root.path());

        let entries = handler.read_dir("/var").unwrap();
        assert_eq!(
            entries,
            vec![RemoteEntry {
                name: "log".to_string(),
                is_dir: true
            }]
        );

        let mut content = String::new();
        handler
            .open_file("/var/log/syslog")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "boot");
    }

    #[test]
    fn missing_paths_are_recoverable_errors() {
        let root = tempfile::tempdir().unwrap();
        let mut handler = LocalHostHandler::new(root.path());

        assert!(handler.read_dir("nope").unwrap_err().is_recoverable());
        assert!(handler.open_file("nope.log").err().unwrap().is_recoverable());
    }

    #[test]
    fn glob_matches_each_segment() {
        let root = tempfile::tempdir().unwrap();
        for path in ["logs/a/x.log", "logs/a/y.txt", "logs/b/z.log", "logs/c/other"] {
            let path = root.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }
        let mut handler = LocalHostHandler::new(root.path());

        assert_eq!(
            handler.glob("/logs/*/*.log").unwrap(),
            vec!["/logs/a/x.log", "/logs/b/z.log"]
        );
        assert_eq!(handler.glob("logs/a/*.txt").unwrap(), vec!["logs/a/y.txt"]);
        assert!(handler.glob("/missing/*.log").unwrap().is_empty());
    }
}
