//! Completions command implementation
//!
//! Handles the `rjs-filter completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap_complete::{generate, Shell};
use std::io::Write;

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// rjs-filter completions bash > /etc/bash_completion.d/rjs-filter
///
/// # Zsh
/// rjs-filter completions zsh > ~/.zfunc/_rjs-filter
///
/// # Fish
/// rjs-filter completions fish > ~/.config/fish/completions/rjs-filter.fish
/// ```
pub fn cmd_completions(shell: Shell, cmd: &mut clap::Command) {
    write_completions(shell, cmd, &mut std::io::stdout());
}

/// Write the completion script for `cmd` to `out`
pub fn write_completions<W: Write>(shell: Shell, cmd: &mut clap::Command, out: &mut W) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn command() -> Command {
        Command::new("rjs-filter")
            .subcommand(Command::new("optimize").arg(Arg::new("files").num_args(1..)))
            .subcommand(Command::new("check"))
    }

    #[test]
    fn test_write_completions_for_all_shells() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
            let mut out = Vec::new();
            write_completions(shell, &mut command(), &mut out);

            let script = String::from_utf8(out).unwrap();
            assert!(script.contains("rjs-filter"), "{:?} script", shell);
            assert!(script.contains("optimize"), "{:?} script", shell);
        }
    }
}
