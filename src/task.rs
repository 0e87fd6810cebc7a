//! Task pipeline.
//!
//! A task pairs a command template (`taskexecute`) with a directive telling what to do with the
//! command's output (`taskget`). Tasks of a host run in name order and share a small state : the
//! output of one task can set how many times the next one repeats, or the list of machines the
//! next one fans out to.
//!
//! ```yaml
//! executetasks:
//!   task01:
//!     taskexecute: ls /var/crash | wc -l
//!     taskget: iterate            # next task runs once per crash dump
//!   task02:
//!     taskexecute: cat /var/crash/dump.iterate.txt
//!     taskget: console
//!   task03:
//!     taskexecute: virsh list --name
//!     taskget: sshlistvms         # output becomes the machine list
//!   task04:
//!     taskexecute: "sshlistvms:uptime;df -h"
//!     taskget: none
//! ```

pub mod execute;
pub mod get;
pub mod interpreter;

pub use interpreter::{InterpreterState, TaskInterpreter, TaskReport};
