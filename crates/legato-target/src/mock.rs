// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock target for testing.
//!
//! Replays scripted command results and shell output so device helpers can
//! be tested without hardware. Every command and shell line is recorded.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use legato_harness::{ExpectError, ExpectReader, LogMarker, LogStream, Match, ScriptedLog};

use crate::error::TargetError;
use crate::target::{CommandOutput, Target};

/// A scripted reply to a command.
#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    Lost,
    Timeout,
}

/// Target backed by in-memory scripts.
///
/// Commands without a scripted reply succeed with empty output. When a
/// command has several replies queued they are used in turn and the last
/// one repeats.
pub struct MockTarget {
    name: String,
    replies: HashMap<String, VecDeque<Reply>>,
    commands: Vec<String>,
    sent: Vec<String>,
    reactions: HashMap<String, Vec<String>>,
    shell: ExpectReader<ScriptedLog>,
    reachable: VecDeque<bool>,
    poll_interval: Duration,
}

impl MockTarget {
    /// Create a reachable mock target of type `wp76xx`.
    #[must_use]
    pub fn new() -> Self {
        Self::named("wp76xx")
    }

    /// Create a reachable mock target of type `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            replies: HashMap::new(),
            commands: Vec::new(),
            sent: Vec::new(),
            reactions: HashMap::new(),
            shell: ExpectReader::new(ScriptedLog::new()),
            reachable: VecDeque::from([true]),
            poll_interval: Duration::ZERO,
        }
    }

    /// Pause between polls. Zero by default.
    pub const fn with_poll_interval(&mut self, interval: Duration) -> &mut Self {
        self.poll_interval = interval;
        self
    }

    /// Queue `output` as a reply to `command`.
    pub fn respond(&mut self, command: &str, output: CommandOutput) -> &mut Self {
        self.push_reply(command, Reply::Output(output))
    }

    /// Queue a successful reply with `output` to `command`.
    pub fn respond_ok(&mut self, command: &str, output: &str) -> &mut Self {
        self.respond(command, CommandOutput::ok(output))
    }

    /// Queue a lost connection as a reply to `command`.
    pub fn respond_lost(&mut self, command: &str) -> &mut Self {
        self.push_reply(command, Reply::Lost)
    }

    /// Queue a timeout as a reply to `command`.
    pub fn respond_timeout(&mut self, command: &str) -> &mut Self {
        self.push_reply(command, Reply::Timeout)
    }

    fn push_reply(&mut self, command: &str, reply: Reply) -> &mut Self {
        self.replies
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// When `line` is sent to the shell, make `output` appear on it.
    pub fn on_sendline<I, S>(&mut self, line: &str, output: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reactions
            .entry(line.to_string())
            .or_default()
            .extend(output.into_iter().map(Into::into));
        self
    }

    /// Append lines to the shell output right away.
    pub fn push_shell_output<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shell.source_mut().extend(lines);
        self
    }

    /// End the shell output stream once the queued lines are read.
    pub fn close_shell(&mut self) -> &mut Self {
        self.shell.source_mut().close();
        self
    }

    /// Script the answers of successive reachability checks.
    ///
    /// The last answer repeats.
    pub fn with_reachability<I>(&mut self, answers: I) -> &mut Self
    where
        I: IntoIterator<Item = bool>,
    {
        self.reachable = answers.into_iter().collect();
        self
    }

    /// Commands passed to [`Target::run`], in order.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Lines passed to [`Target::sendline`], in order.
    #[must_use]
    pub fn sent_lines(&self) -> &[String] {
        &self.sent
    }

    /// Returns true if a command containing `needle` was run.
    #[must_use]
    pub fn ran(&self, needle: &str) -> bool {
        self.commands.iter().any(|c| c.contains(needle))
    }

    fn next_reply(&mut self, command: &str) -> Option<Reply> {
        let queue = self.replies.get_mut(command)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl Target for MockTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, command: &str, timeout: Duration) -> Result<CommandOutput, TargetError> {
        self.commands.push(command.to_string());
        match self.next_reply(command) {
            None => Ok(CommandOutput::ok("")),
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Lost) => Err(TargetError::ConnectionLost {
                command: command.to_string(),
                detail: "scripted connection loss".to_string(),
            }),
            Some(Reply::Timeout) => Err(TargetError::Timeout {
                command: command.to_string(),
                after: timeout,
            }),
        }
    }

    fn sendline(&mut self, line: &str) -> Result<(), TargetError> {
        self.sent.push(line.to_string());
        if let Some(output) = self.reactions.get(line) {
            let output = output.clone();
            self.shell.source_mut().extend(output);
        }
        Ok(())
    }

    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError> {
        self.shell.expect(markers, timeout)
    }

    fn is_reachable(&mut self) -> bool {
        if self.reachable.len() > 1 {
            self.reachable.pop_front().unwrap_or(true)
        } else {
            self.reachable.front().copied().unwrap_or(true)
        }
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
