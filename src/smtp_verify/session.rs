use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::smtp_verify::options::CancellationToken;
use crate::smtp_verify::types::SmtpReply;

/// Upper bound for a single blocking read, so cancellation is noticed promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const QUIT_TIMEOUT: Duration = Duration::from_millis(500);
/// Longest budget a single probe may be given; larger timeouts are clamped.
pub(crate) const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(3600);
const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("timed out")]
    TimedOut,
    #[error("connection closed by server")]
    Disconnected,
    #[error("cancelled")]
    Cancelled,
    #[error("{0}")]
    Protocol(String),
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    fn from_io(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::TimedOut,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Disconnected,
            _ => Self::Io { source },
        }
    }
}

/// Per-probe time budget. Every probe owns its own deadline.
#[derive(Debug, Clone)]
pub(crate) struct Deadline {
    at: Instant,
    cancel: Option<CancellationToken>,
}

impl Deadline {
    pub(crate) fn after(timeout: Duration, cancel: Option<CancellationToken>) -> Self {
        let now = Instant::now();
        Self {
            at: now.checked_add(timeout.min(MAX_PROBE_TIMEOUT)).unwrap_or(now),
            cancel,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn remaining(&self) -> Option<Duration> {
        self.at
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
    }

    fn check(&self) -> Result<Duration, SessionError> {
        if self.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        self.remaining().ok_or(SessionError::TimedOut)
    }
}

/// A live SMTP connection. Dropping the session sends a best-effort `QUIT` and shuts
/// the socket down, whatever path the dialogue took.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    buffer: Vec<u8>,
    deadline: Deadline,
    closed: bool,
}

impl SmtpSession {
    /// Resolves and connects on a helper thread so the deadline and the cancellation
    /// token are polled while the handshake is pending.
    pub(crate) fn connect(host: &str, port: u16, deadline: Deadline) -> Result<Self, SessionError> {
        let budget = deadline.check()?;
        let (tx, rx) = mpsc::channel();
        let target = host.to_string();
        thread::Builder::new()
            .name("smtp-connect".to_string())
            .spawn(move || {
                // a closed channel means the caller gave up; the stream is dropped here
                let _ = tx.send(open_stream(&target, port, budget));
            })
            .map_err(|source| SessionError::Io { source })?;

        let (stream, addr) = loop {
            let remaining = deadline.check()?;
            match rx.recv_timeout(remaining.min(POLL_INTERVAL)) {
                Ok(Ok(connected)) => break connected,
                Ok(Err(err)) if err.kind() == io::ErrorKind::TimedOut => {
                    return Err(SessionError::TimedOut);
                }
                Ok(Err(source)) => {
                    return Err(SessionError::Connect {
                        host: host.to_string(),
                        source,
                    });
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SessionError::Connect {
                        host: host.to_string(),
                        source: io::Error::other("connect worker exited"),
                    });
                }
            }
        };

        tracing::debug!(host, %addr, "connected");
        Ok(Self {
            host: host.to_string(),
            stream,
            buffer: Vec::new(),
            deadline,
            closed: false,
        })
    }

    pub(crate) fn send_command(&mut self, command: &str) -> Result<SmtpReply, SessionError> {
        tracing::debug!(host = %self.host, "C: {command}");
        self.write_line(command)?;
        self.read_reply()
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, SessionError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line.len() < 3 || !line.is_char_boundary(3) {
                return Err(SessionError::Protocol(format!("invalid reply: '{line}'")));
            }
            let parsed_code = line[..3].parse::<u16>().map_err(|_| {
                SessionError::Protocol(format!("invalid status code in line: '{line}'"))
            })?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(SessionError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
            } else {
                code = Some(parsed_code);
            }
            let continuation = line.as_bytes().get(3).copied() == Some(b'-');
            let text = line.get(4..).unwrap_or_default().to_string();
            message_lines.push(text);
            if !continuation {
                break;
            }
        }

        let reply = SmtpReply {
            code: code.unwrap_or_default(),
            message: message_lines.join("\n"),
        };
        tracing::debug!(host = %self.host, "S: {reply}");
        Ok(reply)
    }

    fn write_line(&mut self, command: &str) -> Result<(), SessionError> {
        let remaining = self.deadline.check()?;
        self.stream
            .set_write_timeout(Some(remaining))
            .map_err(|source| SessionError::Io { source })?;
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.stream
            .write_all(&data)
            .and_then(|()| self.stream.flush())
            .map_err(SessionError::from_io)
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return String::from_utf8(line)
                    .map_err(|err| SessionError::Protocol(format!("utf8 error: {err}")));
            }
            if self.buffer.len() > MAX_LINE_LEN {
                return Err(SessionError::Protocol("reply line too long".to_string()));
            }

            let remaining = self.deadline.check()?;
            self.stream
                .set_read_timeout(Some(remaining.min(POLL_INTERVAL)))
                .map_err(|source| SessionError::Io { source })?;

            let mut buf = [0u8; 512];
            match self.stream.read(&mut buf) {
                Ok(0) => return Err(SessionError::Disconnected),
                Ok(read) => self.buffer.extend_from_slice(&buf[..read]),
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) => {}
                Err(err) => return Err(SessionError::from_io(err)),
            }
        }
    }

    /// Ends the conversation without committing anything.
    pub(crate) fn quit(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.set_write_timeout(Some(QUIT_TIMEOUT));
        if self.stream.write_all(b"QUIT\r\n").is_err() {
            return;
        }
        tracing::debug!(host = %self.host, "C: QUIT");
        self.deadline.at = self.deadline.at.min(Instant::now() + QUIT_TIMEOUT);
        let _ = self.read_reply();
    }
}

fn open_stream(host: &str, port: u16, budget: Duration) -> io::Result<(TcpStream, SocketAddr)> {
    let started = Instant::now();
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        let Some(left) = budget
            .checked_sub(started.elapsed())
            .filter(|left| !left.is_zero())
        else {
            return Err(io::Error::from(io::ErrorKind::TimedOut));
        };
        match TcpStream::connect_timeout(&addr, left) {
            Ok(stream) => return Ok((stream, addr)),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "no socket address available")
    }))
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        self.quit();
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
