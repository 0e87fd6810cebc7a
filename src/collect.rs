//! Remote file collection : walk remote trees, copy files locally, unpack what needs to be.

pub mod transfer;
pub mod walker;

use std::collections::HashSet;

/// Remote paths that must not be collected.
///
/// Lookup is an exact string comparison against the path produced by the walk : `/var/log/x.log`
/// does not exclude `/var/log//x.log` nor `x.log`, and no wildcard is interpreted.
#[derive(Debug, Clone, Default)]
pub struct ExceptionSet {
    paths: HashSet<String>,
}

impl ExceptionSet {
    pub fn new() -> ExceptionSet {
        ExceptionSet::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExceptionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ExceptionSet {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
