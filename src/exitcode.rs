//! Process exit codes of the `getlogs` binary.

/// Returned once every host has been processed. Supervisors rely on this value to tell a
/// finished run apart from a crash, so it is not zero.
pub const RUN_COMPLETED: i32 = 3;

/// Returned when a fatal error halted the run.
pub const FATAL_ERROR: i32 = 1;
