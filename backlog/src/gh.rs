//! Running the `gh` CLI.

use std::io::{ErrorKind, Write};
use std::process::Command;

use serde::de::DeserializeOwned;

use crate::error::{BacklogError, Result};

/// Captured result of one `gh` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GhOutput {
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GhOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into [`BacklogError::CommandFailed`].
    pub fn into_stdout(self) -> Result<String> {
        if self.is_success() {
            Ok(self.stdout)
        } else {
            Err(BacklogError::CommandFailed {
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Something that can execute `gh` with arguments.
pub trait GhRunner {
    /// Run `gh <args>` and capture its output.
    ///
    /// A non-zero exit is not an error at this level.
    fn run(&self, args: &[String]) -> Result<GhOutput>;
}

/// Runs the real `gh` executable.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl GhCli {
    pub fn new() -> Self {
        Self {
            program: "gh".to_string(),
        }
    }

    /// Use a different executable, e.g. a wrapper script.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GhRunner for GhCli {
    fn run(&self, args: &[String]) -> Result<GhOutput> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    BacklogError::GhNotFound
                } else {
                    BacklogError::Io(e)
                }
            })?;

        Ok(GhOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Command line as echoed to the user.
pub fn format_command(args: &[String]) -> String {
    let mut line = String::from("gh");
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Echo `$ gh ...`, run it, and fail on a non-zero exit.
pub fn run_echoed<R, W>(runner: &R, args: &[String], out: &mut W) -> Result<String>
where
    R: GhRunner + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "  $ {}", format_command(args))?;
    runner.run(args)?.into_stdout()
}

/// Run a read-only query quietly and fail on a non-zero exit.
pub fn query<R: GhRunner + ?Sized>(runner: &R, args: &[String]) -> Result<String> {
    log::debug!("$ {}", format_command(args));
    runner.run(args)?.into_stdout()
}

/// Parse `gh api --paginate` output.
///
/// Each page is printed as its own JSON array, so the output may hold
/// several arrays back to back.
pub fn parse_paginated<T: DeserializeOwned>(stdout: &str) -> Result<Vec<T>> {
    let mut items = Vec::new();
    for page in serde_json::Deserializer::from_str(stdout).into_iter::<Vec<T>>() {
        items.extend(page?);
    }
    Ok(items)
}

/// Keep a query's result, or warn and fall back to the default.
///
/// Fatal errors still propagate.
pub fn or_degraded<T: Default>(result: Result<T>, what: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log::warn!("Could not fetch {}: {}", what, e);
            Ok(T::default())
        }
    }
}

/// Build an owned argument list.
pub fn args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_parse_paginated_concatenated_pages() {
        let stdout = "[{\"name\":\"a\"},{\"name\":\"b\"}]\n[{\"name\":\"c\"}]";
        let items: Vec<Named> = parse_paginated(stdout).unwrap();
        let names: Vec<_> = items.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_paginated_empty_and_invalid() {
        let items: Vec<Named> = parse_paginated("").unwrap();
        assert!(items.is_empty());
        assert!(parse_paginated::<Named>("{\"message\":\"oops\"}").is_err());
    }

    #[test]
    fn test_into_stdout() {
        assert_eq!(GhOutput::success("ok").into_stdout().unwrap(), "ok");
        let err = GhOutput::failure(1, "not found\n").into_stdout().unwrap_err();
        assert_eq!(err.to_string(), "gh command failed (exit 1): not found");
    }

    #[test]
    fn test_format_command() {
        assert_eq!(
            format_command(&args(["label", "list", "--limit", "500"])),
            "gh label list --limit 500"
        );
    }

    #[test]
    fn test_or_degraded() {
        let failed: Result<Vec<String>> = Err(BacklogError::CommandFailed {
            status: Some(1),
            stderr: String::new(),
        });
        assert!(or_degraded(failed, "labels").unwrap().is_empty());

        let missing: Result<Vec<String>> = Err(BacklogError::GhNotFound);
        assert!(or_degraded(missing, "labels").is_err());
    }

    #[test]
    fn test_missing_program_is_gh_not_found() {
        let cli = GhCli::with_program("definitely-not-a-real-gh-binary");
        let err = cli.run(&args(["--version"])).unwrap_err();
        assert!(matches!(err, BacklogError::GhNotFound));
    }
}
