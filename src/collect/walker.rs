use crate::collect::ExceptionSet;
use crate::error::Error;
use crate::host_handler::{HostHandler, join_remote_path};
use tracing::{debug, warn};

/// Never collected, whatever the exception set says.
pub(crate) const LOST_AND_FOUND: &str = "lost+found";

/// Returns every file to collect under `path`.
///
/// A path containing `*.` is a glob : its matches are returned as they are, without recursion
/// nor exception filtering (callers filter them). Any other path is listed as a directory and walked recursively;
/// directories never appear in the result. A directory that can't be listed is logged and
/// contributes nothing, other errors are fatal and returned.
pub fn walk<Handler: HostHandler + ?Sized>(
    handler: &mut Handler,
    path: &str,
    exceptions: &ExceptionSet,
) -> Result<Vec<String>, Error> {
    if path.contains("*.") {
        return match handler.glob(path) {
            Ok(matches) => Ok(matches),
            Err(error_detail) if is_soft(&error_detail) => {
                warn!("glob error for {} : {}", path, error_detail);
                Ok(Vec::new())
            }
            Err(error_detail) => Err(error_detail),
        };
    }

    let entries = match handler.read_dir(path) {
        Ok(entries) => entries,
        Err(error_detail) if error_detail.is_recoverable() => {
            warn!("{}", error_detail);
            return Ok(Vec::new());
        }
        Err(error_detail) => return Err(error_detail),
    };

    let mut files: Vec<String> = Vec::new();
    for entry in entries {
        if entry.name == LOST_AND_FOUND {
            continue;
        }

        let entry_path = join_remote_path(path, &entry.name);
        if exceptions.contains(&entry_path) {
            debug!("skipping {} (exception)", entry_path);
            continue;
        }

        if entry.is_dir {
            debug!("dir: {}", entry_path);
            files.extend(walk(handler, &entry_path, exceptions)?);
        } else {
            files.push(entry_path);
        }
    }

    Ok(files)
}

// A malformed pattern only spoils this path spec, not the run
fn is_soft(error_detail: &Error) -> bool {
    error_detail.is_recoverable() || matches!(error_detail, Error::FailureToParseContent(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host_handler::localhost::LocalHostHandler;

    fn remote_tree(files: &[&str]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for file in files {
            let path = root.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, file.as_bytes()).unwrap();
        }
        root
    }

    fn sorted(mut files: Vec<String>) -> Vec<String> {
        files.sort();
        files
    }

    #[test]
    fn exceptions_are_matched_exactly() {
        let root = remote_tree(&["a/1.log", "a/2.log", "b/3.log"]);
        let mut handler = LocalHostHandler::new(root.path());
        let exceptions: ExceptionSet = ["a/2.log"].into_iter().collect();

        assert_eq!(walk(&mut handler, "a/", &exceptions).unwrap(), vec!["a/1.log"]);
        assert_eq!(walk(&mut handler, "b/", &exceptions).unwrap(), vec!["b/3.log"]);
    }

    #[test]
    fn subdirectories_are_flattened() {
        let root = remote_tree(&["logs/app.log", "logs/old/app.1", "logs/old/deeper/app.2"]);
        let mut handler = LocalHostHandler::new(root.path());

        assert_eq!(
            sorted(walk(&mut handler, "/logs", &ExceptionSet::new()).unwrap()),
            vec![
                "/logs/app.log",
                "/logs/old/app.1",
                "/logs/old/deeper/app.2"
            ]
        );
    }

    #[test]
    fn excepted_directory_is_pruned() {
        let root = remote_tree(&["logs/app.log", "logs/old/app.1"]);
        let mut handler = LocalHostHandler::new(root.path());
        let exceptions: ExceptionSet = ["/logs/old"].into_iter().collect();

        assert_eq!(
            walk(&mut handler, "/logs", &exceptions).unwrap(),
            vec!["/logs/app.log"]
        );
    }

    #[test]
    fn lost_and_found_is_never_returned() {
        let root = remote_tree(&["data/lost+found/orphan", "data/kept.log"]);
        let mut handler = LocalHostHandler::new(root.path());

        let files = walk(&mut handler, "data", &ExceptionSet::new()).unwrap();

        assert_eq!(files, vec!["data/kept.log"]);
        assert!(files.iter().all(|file| !file.contains("lost+found")));
    }

    #[test]
    fn unreadable_directory_yields_nothing() {
        let root = remote_tree(&["a/1.log"]);
        let mut handler = LocalHostHandler::new(root.path());

        assert!(walk(&mut handler, "missing", &ExceptionSet::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn glob_matches_are_returned_without_filtering() {
        let root = remote_tree(&["logs/a.log", "logs/b.log", "logs/c.txt", "logs/sub/d.log"]);
        let mut handler = LocalHostHandler::new(root.path());
        let exceptions: ExceptionSet = ["logs/a.log"].into_iter().collect();

        let matches = walk(&mut handler, "logs/*.log", &exceptions).unwrap();

        assert_eq!(matches, vec!["logs/a.log", "logs/b.log"]);
        assert!(!matches.contains(&"logs/sub/d.log".to_string()));
    }
}
