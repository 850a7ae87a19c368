//! Stand-ins for r.js
//!
//! Both flavours read the build profile they are handed, locate the entry
//! point among `paths` (the key that is a 64-digit hex digest) and write a
//! `/* optimized */`-prefixed copy of it to `out`.

#![allow(dead_code)]

use rjs_filter::infra::CommandExecutor;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use std::sync::{Arc, Mutex};

/// Prefix every stand-in puts in front of the optimized content
pub const BANNER: &str = "/* optimized */";

/// Parse the `(...)` profile text r.js receives
pub fn parse_profile(text: &str) -> Value {
    assert!(
        text.starts_with('(') && text.ends_with(')'),
        "profile should be wrapped in parentheses: {}",
        text
    );
    serde_json::from_str(&text[1..text.len() - 1]).expect("profile should be valid JSON")
}

/// Path of the entry point file registered in the profile's `paths`
pub fn entry_point_input(profile: &Value) -> Option<String> {
    profile["paths"]
        .as_object()?
        .iter()
        .find(|(key, _)| key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit()))
        .and_then(|(_, value)| value.as_str().map(str::to_string))
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// In-process optimizer that records every profile it receives
#[derive(Clone, Default)]
pub struct CopyingOptimizer {
    profiles: Arc<Mutex<Vec<Value>>>,
}

impl CopyingOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles received so far, in call order
    pub fn profiles(&self) -> Vec<Value> {
        self.profiles.lock().unwrap().clone()
    }
}

impl CommandExecutor for CopyingOptimizer {
    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        let args: Vec<_> = cmd.get_args().map(|a| a.to_owned()).collect();
        let flag = args.iter().position(|a| a == "-o").expect("-o flag");
        let text = fs::read_to_string(&args[flag + 1])?;
        let profile = parse_profile(&text);

        let input = entry_point_input(&profile).expect("entry point in paths");
        let source = fs::read_to_string(input)?;
        let out = profile["out"].as_str().expect("out").to_string();
        fs::write(out, format!("{}{}", BANNER, source))?;

        self.profiles.lock().unwrap().push(profile);
        Ok(Output {
            status: exit_status(0),
            stdout: b"Tracing dependencies for: main\n".to_vec(),
            stderr: vec![],
        })
    }
}

/// `sh` body that behaves like the in-process [`CopyingOptimizer`]
///
/// Invoked as `sh <script> -o <profile>`.
pub const COPY_SCRIPT: &str = r#"profile="$2"
json=$(cat "$profile")
out=$(printf '%s' "$json" | sed -n 's/.*"out":"\([^"]*\)".*/\1/p')
input=$(printf '%s' "$json" | sed -n 's/.*"[0-9a-f]\{64\}":"\([^"]*\)".*/\1/p')
echo "Tracing dependencies for: $input"
{ printf '%s' '/* optimized */'; cat "$input"; } > "$out"
"#;

/// `sh` body that fails like r.js does on a syntax error
pub const FAIL_SCRIPT: &str = r#"echo "Tracing dependencies for: main"
echo "Error: Parse error using esprima for file: main.js" >&2
exit 3
"#;

/// `sh` body that succeeds but removes its output file
pub const LOSE_OUTPUT_SCRIPT: &str = r#"json=$(cat "$2")
out=$(printf '%s' "$json" | sed -n 's/.*"out":"\([^"]*\)".*/\1/p')
rm -f "$out"
"#;

/// `sh` body that reports "command not found"
pub const NOT_FOUND_SCRIPT: &str = "exit 127\n";

/// Write an executable `sh` script into `dir`
pub fn write_script(dir: &Path, name: &str, body: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(path)
}
