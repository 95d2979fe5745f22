use crate::process::error::{ProcessError, ProcessResult};
use log::debug;
use serde::Deserialize;
use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::io::{Read, Seek, SeekFrom};
use std::process::Stdio;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub mod error;

pub const FILE_PLACEHOLDER: &str = "%f";

/// A configured command line, split into arguments once.
///
/// The `%f` token is replaced by position with the file argument(s); the
/// template itself is never handed to a shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CommandTemplate {
    tokens: Vec<String>,
    placeholder: usize,
}

impl CommandTemplate {
    pub fn parse(line: &str) -> ProcessResult<Self> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }

        let placeholder = tokens
            .iter()
            .position(|token| token == FILE_PLACEHOLDER)
            .ok_or_else(|| ProcessError::MissingPlaceholder(line.to_string()))?;

        Ok(Self {
            tokens,
            placeholder,
        })
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn argv<S: AsRef<OsStr>>(&self, files: &[S]) -> Vec<OsString> {
        let mut argv: Vec<OsString> = Vec::with_capacity(self.tokens.len() + files.len());
        argv.extend(self.tokens[..self.placeholder].iter().map(OsString::from));
        argv.extend(files.iter().map(|file| file.as_ref().to_os_string()));
        argv.extend(
            self.tokens[self.placeholder + 1..]
                .iter()
                .map(OsString::from),
        );
        argv
    }

    fn command<S: AsRef<OsStr>>(&self, files: &[S]) -> Command {
        let argv = self.argv(files);
        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]);
        command
    }
}

impl TryFrom<String> for CommandTemplate {
    type Error = ProcessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl Display for CommandTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// A running decoder/encoder whose stderr is collected into an anonymous temp file.
#[derive(Debug)]
pub struct ChildProcess {
    program: String,
    child: Child,
    stderr_log: std::fs::File,
}

impl ChildProcess {
    fn spawn<S: AsRef<OsStr>>(
        template: &CommandTemplate,
        files: &[S],
        stdin: Stdio,
        stdout: Stdio,
    ) -> ProcessResult<Self> {
        let stderr_log = tempfile::tempfile()?;
        let program = template.program().to_string();

        debug!(
            "Spawning {:?}",
            template
                .argv(files)
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
        );

        let child = template
            .command(files)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::from(stderr_log.try_clone()?))
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::SpawnError {
                program: program.clone(),
                source,
            })?;

        Ok(Self {
            program,
            child,
            stderr_log,
        })
    }

    /// Starts a decoder writing PCM to its stdout.
    pub fn spawn_decoder(
        template: &CommandTemplate,
        input: &OsStr,
    ) -> ProcessResult<(Self, ChildStdout)> {
        let mut process = Self::spawn(template, &[input], Stdio::null(), Stdio::piped())?;
        let stdout = process
            .child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("decoder stdout was not captured"))?;
        Ok((process, stdout))
    }

    /// Starts an encoder reading PCM from its stdin.
    pub fn spawn_encoder(
        template: &CommandTemplate,
        output: &OsStr,
    ) -> ProcessResult<(Self, ChildStdin)> {
        let mut process = Self::spawn(template, &[output], Stdio::piped(), Stdio::null())?;
        let stdin = process
            .child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("encoder stdin was not captured"))?;
        Ok((process, stdin))
    }

    /// Waits for the child and turns a non-zero exit into an error carrying its stderr.
    pub async fn wait(mut self) -> ProcessResult<()> {
        let status = self.child.wait().await?;
        if status.success() {
            return Ok(());
        }

        Err(ProcessError::ChildFailed {
            program: self.program.clone(),
            status,
            stderr: self.stderr_output(),
        })
    }

    /// Stops a child whose remaining output is not needed.
    pub async fn kill(mut self) -> ProcessResult<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }
        Ok(())
    }

    pub fn stderr_output(&mut self) -> String {
        let mut buffer = Vec::new();
        if self.stderr_log.seek(SeekFrom::Start(0)).is_ok() {
            let _ = self.stderr_log.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).trim().to_string()
    }
}

/// Runs a command to completion over `files`, without any piped audio.
pub async fn run<S: AsRef<OsStr>>(template: &CommandTemplate, files: &[S]) -> ProcessResult<()> {
    ChildProcess::spawn(template, files, Stdio::null(), Stdio::null())?
        .wait()
        .await
}
