/// Replaced by the iteration number when a task runs repeatedly.
pub const ITERATE_MARKER: &str = "iterate";

/// Prefix of a command template that runs once per machine of the current machine list.
pub const VM_FANOUT_MARKER: &str = "sshlistvms:";

/// What the execute phase of a task does when no iteration is pending. Empty templates never
/// get here, the interpreter skips those tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteStep<'a> {
    /// Run every sub-command on every machine of the machine list.
    FanOut(Vec<&'a str>),
    /// Run the template once.
    Command(&'a str),
}

impl<'a> ExecuteStep<'a> {
    pub fn parse(template: &'a str) -> ExecuteStep<'a> {
        match template.trim_start().strip_prefix(VM_FANOUT_MARKER) {
            Some(sub_commands) => ExecuteStep::FanOut(
                sub_commands
                    .split(';')
                    .map(str::trim)
                    .filter(|sub_command| !sub_command.is_empty())
                    .collect(),
            ),
            None => ExecuteStep::Command(template),
        }
    }
}

/// Literal substitution of every `iterate` occurrence by `iteration`.
pub fn substitute_iteration(template: &str, iteration: u32) -> String {
    template.replace(ITERATE_MARKER, &iteration.to_string())
}

/// Command run on the collected host to reach one machine of the machine list.
pub fn vm_command(vm: &str, sub_command: &str) -> String {
    format!("ssh {} {}", vm, sub_command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fanout_marker_is_stripped_and_split() {
        assert_eq!(
            ExecuteStep::parse("sshlistvms:uptime; df -h;"),
            ExecuteStep::FanOut(vec!["uptime", "df -h"])
        );
    }

    #[test]
    fn marker_elsewhere_is_a_plain_command() {
        assert_eq!(
            ExecuteStep::parse("echo sshlistvms: later"),
            ExecuteStep::Command("echo sshlistvms: later")
        );
    }

    #[test]
    fn every_marker_occurrence_is_substituted() {
        assert_eq!(
            substitute_iteration("cp /d/iterate.log /tmp/iterate", 12),
            "cp /d/12.log /tmp/12"
        );
        assert_eq!(vm_command("vm1", "uptime"), "ssh vm1 uptime");
    }
}
