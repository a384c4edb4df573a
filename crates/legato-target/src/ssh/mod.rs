// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Device reached through the system `ssh` client.
//!
//! Each [`Target::run`] is its own `ssh` invocation. The interactive shell
//! used by [`Target::sendline`]/[`Target::expect`] is one long-running
//! `ssh -T` session, started on first use and dropped whenever the device
//! stops answering, so it is re-established after a reboot.

#[cfg(test)]
mod ssh_test;

use std::io::Write;
use std::process::{Child, ChildStdin, Stdio};
use std::time::{Duration, Instant};

use legato_harness::{
    ChannelSource, ExpectError, ExpectReader, LineRead, LineSource, LogMarker, LogStream, Match,
};
use tracing::{debug, info, warn};

use crate::config::TargetConfig;
use crate::error::TargetError;
use crate::process::HostCommand;
use crate::target::{CommandOutput, Target};

/// Exit status the `ssh` client uses for its own failures.
pub const SSH_CONNECTION_FAILURE: i32 = 255;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS + 5);

/// `ssh` client options for `config`, without the destination.
#[must_use]
pub fn ssh_args(config: &TargetConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "-o",
        "BatchMode=yes",
        "-o",
        "StrictHostKeyChecking=no",
        "-o",
        "UserKnownHostsFile=/dev/null",
        "-o",
        "LogLevel=ERROR",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    args.push("-o".to_string());
    args.push(format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"));
    args.push("-p".to_string());
    args.push(config.port.to_string());
    if let Some(identity) = &config.identity_file {
        args.push("-i".to_string());
        args.push(identity.display().to_string());
    }
    for option in &config.ssh_options {
        args.push("-o".to_string());
        args.push(option.clone());
    }
    args
}

/// Map the raw result of an `ssh` invocation.
///
/// Status 255 comes from the client itself, not from the remote command.
pub fn interpret_exit(command: &str, output: CommandOutput) -> Result<CommandOutput, TargetError> {
    if output.exit_code == SSH_CONNECTION_FAILURE {
        return Err(TargetError::ConnectionLost {
            command: command.to_string(),
            detail: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

struct InteractiveShell {
    child: Child,
    stdin: ChildStdin,
    reader: ExpectReader<ChannelSource>,
}

impl Drop for InteractiveShell {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A remote command whose standard output is a line source.
///
/// The remote command is stopped when the stream is dropped.
pub struct RemoteStream {
    child: Child,
    source: ChannelSource,
}

impl LineSource for RemoteStream {
    fn next_line(&mut self, deadline: Instant) -> LineRead {
        self.source.next_line(deadline)
    }
}

impl Drop for RemoteStream {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Target reached over SSH.
pub struct SshTarget {
    config: TargetConfig,
    shell: Option<InteractiveShell>,
}

impl SshTarget {
    #[must_use]
    pub const fn new(config: TargetConfig) -> Self {
        Self {
            config,
            shell: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TargetConfig {
        &self.config
    }

    fn ssh(&self, flags: &[&str]) -> HostCommand {
        HostCommand::new(self.config.ssh_program.display().to_string())
            .args(ssh_args(&self.config))
            .args(flags.iter().copied())
            .arg(self.config.destination())
    }

    /// Start `command` on the device and stream its output.
    pub fn spawn_stream(&self, command: &str) -> Result<RemoteStream, TargetError> {
        debug!(command, "starting remote stream");
        let mut child = self
            .ssh(&[])
            .arg(command)
            .spawn(Stdio::null(), Stdio::piped(), Stdio::null())?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(TargetError::ConnectionLost {
                command: command.to_string(),
                detail: "no stdout pipe".to_string(),
            });
        };
        let (source, _reader) = ChannelSource::spawn_reader(stdout);
        Ok(RemoteStream { child, source })
    }

    fn shell(&mut self) -> Result<&mut InteractiveShell, TargetError> {
        if self.shell.is_none() {
            info!(host = %self.config.host, "opening interactive shell");
            let mut child = self
                .ssh(&["-T"])
                .spawn(Stdio::piped(), Stdio::piped(), Stdio::piped())?;
            let (Some(stdin), Some(stdout), Some(stderr)) =
                (child.stdin.take(), child.stdout.take(), child.stderr.take())
            else {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TargetError::ConnectionLost {
                    command: "ssh -T".to_string(),
                    detail: "no stdio pipes".to_string(),
                });
            };
            // Device tools report failures on stderr.
            let (source, _readers) = ChannelSource::spawn_merged(stdout, stderr);
            self.shell = Some(InteractiveShell {
                child,
                stdin,
                reader: ExpectReader::new(source),
            });
        }
        self.shell.as_mut().ok_or_else(|| TargetError::ConnectionLost {
            command: "ssh -T".to_string(),
            detail: "shell unavailable".to_string(),
        })
    }

    /// Drop the interactive shell; the next use opens a new one.
    pub fn reset_shell(&mut self) {
        if self.shell.take().is_some() {
            debug!("interactive shell closed");
        }
    }
}

impl Target for SshTarget {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn run(&mut self, command: &str, timeout: Duration) -> Result<CommandOutput, TargetError> {
        let output = self.ssh(&[]).arg(command).timeout(timeout).run()?;
        let output = interpret_exit(command, output)?;
        debug!(command, exit_code = output.exit_code, "remote command finished");
        Ok(output)
    }

    fn sendline(&mut self, line: &str) -> Result<(), TargetError> {
        let shell = self.shell()?;
        let written = shell
            .stdin
            .write_all(line.as_bytes())
            .and_then(|()| shell.stdin.write_all(b"\n"))
            .and_then(|()| shell.stdin.flush());
        if let Err(err) = written {
            warn!(line, "interactive shell is gone: {err}");
            self.reset_shell();
            return Err(TargetError::ConnectionLost {
                command: line.to_string(),
                detail: err.to_string(),
            });
        }
        debug!(line, "sent to shell");
        Ok(())
    }

    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError> {
        let shell = self.shell().map_err(|err| {
            ExpectError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                err.to_string(),
            ))
        })?;
        let result = shell.reader.expect(markers, timeout);
        if matches!(&result, Err(err) if err.is_closed()) {
            self.reset_shell();
        }
        result
    }

    fn is_reachable(&mut self) -> bool {
        let reachable = matches!(self.run("true", REACHABILITY_TIMEOUT), Ok(out) if out.success());
        if !reachable {
            self.reset_shell();
        }
        reachable
    }

    fn poll_interval(&self) -> Duration {
        self.config.timeouts.poll_interval()
    }

    fn reboot(&mut self, timeout: Duration) -> Result<(), TargetError> {
        info!(host = %self.config.host, "rebooting device");
        self.reset_shell();
        match self.run("/sbin/reboot", self.config.timeouts.command()) {
            Ok(_) | Err(TargetError::ConnectionLost { .. } | TargetError::Timeout { .. }) => {}
            Err(err) => return Err(err),
        }
        let down = self.config.timeouts.device_down();
        if !self.wait_for_device_down(down) {
            return Err(TargetError::Timeout {
                command: "wait for device down".to_string(),
                after: down,
            });
        }
        self.wait_for_reboot(timeout)
    }
}
