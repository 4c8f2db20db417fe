// CLI subcommand handlers.
//
// main.rs parses arguments and dispatches here; each handler loads its
// inputs, does the work through routenet-lib and prints the result.

pub mod inspect;
pub mod plan;

/// Whether a command produced its result or a reported failure.
///
/// Failures that were already printed (an unreachable goal, an expired
/// budget) are not errors of the CLI itself, but still exit non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
}

impl CommandStatus {
    pub fn is_success(self) -> bool {
        self == CommandStatus::Success
    }
}
