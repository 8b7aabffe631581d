//! External tool invocation.
//! Build steps are described as [`ToolCommand`] values and handed to a
//! [`CommandRunner`], so planning can be tested without `go` or `docker`.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// One invocation of an external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// `KEY=VALUE` entries added to the inherited environment
    pub envs: Vec<String>,
    /// Working directory, the current one when unset
    pub dir: Option<PathBuf>,
    /// Whether the tool's stdout is echoed while it is captured
    pub echo: bool,
}

impl ToolCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs<I, S>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.envs.extend(envs.into_iter().map(Into::into));
        self
    }

    pub fn dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn echo(mut self) -> Self {
        self.echo = true;
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Trait for executing external tools.
pub trait CommandRunner {
    /// Runs `command` to completion and returns its captured stdout.
    ///
    /// # Errors
    /// * `Error::IoError` if the tool cannot be started
    /// * `Error::CommandError` if it exits unsuccessfully
    fn run(&self, command: &ToolCommand) -> Result<String>;
}

/// Runs tools as child processes of this one.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<String> {
        debug!("Executing {command}");
        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        for entry in &command.envs {
            match entry.split_once('=') {
                Some((key, value)) => {
                    debug!("env: {entry}");
                    process.env(key, value);
                }
                None => warn!("Ignoring malformed environment entry '{entry}'"),
            }
        }
        if let Some(dir) = &command.dir {
            process.current_dir(dir);
        }

        let mut child = process.spawn()?;
        let mut captured = String::new();
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line?;
                if command.echo {
                    println!("{line}");
                }
                captured.push_str(&line);
                captured.push('\n');
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(Error::CommandError {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let command = ToolCommand::new("docker").arg("push").arg("acme/api:v1");
        assert_eq!(command.to_string(), "docker push acme/api:v1");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let command = ToolCommand::new("sh")
            .args(["-c", "echo $GREETING"])
            .envs(["GREETING=hello"]);
        assert_eq!(SystemRunner.run(&command).unwrap(), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_failure() {
        let command = ToolCommand::new("sh").args(["-c", "exit 3"]);
        assert!(matches!(SystemRunner.run(&command), Err(Error::CommandError { .. })));
    }
}
