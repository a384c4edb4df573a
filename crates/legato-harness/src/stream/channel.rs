// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Line source fed by a reader thread.

use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::{LineRead, LineSource};

/// Lines received over a channel.
///
/// The sending side is usually a thread draining a child process's stdout.
/// When every sender is gone the source reports [`LineRead::Closed`].
pub struct ChannelSource {
    rx: Receiver<std::io::Result<String>>,
}

impl ChannelSource {
    /// Creates a source and the sender that feeds it.
    #[must_use]
    pub fn pair() -> (Sender<std::io::Result<String>>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Spawns a thread that splits `reader` into lines and feeds them in.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, and trailing `\r\n`
    /// is stripped. The thread ends at EOF, on a read error (which is
    /// forwarded), or when the source is dropped.
    #[must_use]
    pub fn spawn_reader<R>(reader: R) -> (Self, JoinHandle<()>)
    where
        R: Read + Send + 'static,
    {
        let (tx, source) = Self::pair();
        (source, feed(tx, reader))
    }

    /// Like [`ChannelSource::spawn_reader`], interleaving two readers.
    ///
    /// Used for a child's stdout and stderr. The source closes once both
    /// readers reached EOF.
    #[must_use]
    pub fn spawn_merged<A, B>(first: A, second: B) -> (Self, [JoinHandle<()>; 2])
    where
        A: Read + Send + 'static,
        B: Read + Send + 'static,
    {
        let (tx, source) = Self::pair();
        let other = feed(tx.clone(), second);
        (source, [feed(tx, first), other])
    }
}

fn feed<R>(tx: Sender<std::io::Result<String>>, reader: R) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n' | b'\r')) {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
    })
}

impl LineSource for ChannelSource {
    fn next_line(&mut self, deadline: Instant) -> LineRead {
        let wait = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(wait) {
            Ok(Ok(line)) => LineRead::Line(line),
            Ok(Err(err)) => LineRead::Failed(err),
            Err(RecvTimeoutError::Timeout) => LineRead::TimedOut,
            Err(RecvTimeoutError::Disconnected) => LineRead::Closed,
        }
    }
}
