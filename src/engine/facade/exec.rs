//! Command execution inside running containers.

use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::{GuardedStream, RuntimeFacade};
use crate::engine::client::ContainerClient;
use crate::error::{ConfigError, DockhandError, EngineError};

/// Combined stdout and stderr of an exec session, in arrival order.
pub type ByteStream<'a> = GuardedStream<'a, Bytes>;

const EXEC_STREAM: &str = "exec";

impl<C: ContainerClient> RuntimeFacade<C> {
    /// Run `command` in container `id` and return its output lazily.
    ///
    /// The session attaches stdout and stderr without a TTY. The command
    /// keeps running while the returned stream is polled; the stream ends
    /// when the session's output closes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` for an empty command,
    /// `EngineError::Api` when the engine rejects the session, and
    /// `EngineError::ExecNotAttached` when the engine starts the session
    /// detached.
    pub async fn exec(&self, id: &str, command: Vec<String>) -> Result<ByteStream<'_>, DockhandError> {
        let argv = validate_command(command)?;
        debug!(container = id, command = ?argv, "creating exec session");

        let created = self
            .call(self.client.create_exec(id, build_create_exec_options(argv)))
            .await?;
        let started = self
            .call(
                self.client
                    .start_exec(&created.id, Some(build_start_exec_options())),
            )
            .await?;

        match started {
            StartExecResults::Attached { output, input } => {
                drop(input);
                let frames = output.map(|frame| frame.map(frame_bytes));
                Ok(self.guard(Box::pin(frames)))
            }
            StartExecResults::Detached => Err(DockhandError::from(EngineError::ExecNotAttached {
                container: String::from(id),
            })),
        }
    }

    /// Run `command` in container `id`, copying its output into `writer`
    /// until the session ends.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::exec`], stream errors, and
    /// `EngineError::Relay` when writing fails.
    pub async fn exec_to_writer<W>(
        &self,
        id: &str,
        command: Vec<String>,
        writer: &mut W,
    ) -> Result<(), DockhandError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut output = self.exec(id, command).await?;
        while let Some(chunk) = output.next().await {
            writer.write_all(&chunk?).await.map_err(relay_error)?;
        }
        writer.flush().await.map_err(relay_error)?;
        Ok(())
    }
}

fn build_create_exec_options(command: Vec<String>) -> CreateExecOptions<String> {
    CreateExecOptions::<String> {
        attach_stdin: Some(false),
        attach_stdout: Some(true),
        attach_stderr: Some(true),
        tty: Some(false),
        cmd: Some(command),
        ..CreateExecOptions::default()
    }
}

const fn build_start_exec_options() -> StartExecOptions {
    StartExecOptions {
        detach: false,
        tty: false,
        output_capacity: None,
    }
}

/// Payload of a multiplexed frame, whichever stream it came from.
pub(super) fn frame_bytes(frame: LogOutput) -> Bytes {
    match frame {
        LogOutput::StdErr { message }
        | LogOutput::StdOut { message }
        | LogOutput::StdIn { message }
        | LogOutput::Console { message } => message,
    }
}

fn validate_command(command: Vec<String>) -> Result<Vec<String>, DockhandError> {
    if command.is_empty() {
        return Err(DockhandError::from(ConfigError::MissingRequired {
            field: String::from("command"),
        }));
    }

    let executable = command.first().map(String::as_str).unwrap_or_default();
    if executable.trim().is_empty() {
        return Err(DockhandError::from(ConfigError::InvalidValue {
            field: String::from("command"),
            reason: String::from("command executable must not be empty"),
        }));
    }

    Ok(command)
}

fn relay_error(source: std::io::Error) -> DockhandError {
    DockhandError::from(EngineError::Relay {
        stream: EXEC_STREAM,
        source,
    })
}
