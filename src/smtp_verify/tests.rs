use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use super::{CancellationToken, SmtpProbe, SmtpProbeError, SmtpProbeOptions};
use crate::mx::tests::StubResolver;
use crate::mx::{MxRecord, MxStatus};

type Received = io::Result<Vec<String>>;

fn spawn_server<F>(handler: F) -> (u16, thread::JoinHandle<Received>)
where
    F: FnOnce(TcpStream) -> Received + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();
    let (ready_tx, ready_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        ready_tx.send(()).ok();
        let (stream, _) = listener.accept()?;
        handler(stream)
    });
    ready_rx.recv().expect("server ready");
    (port, handle)
}

/// Plays `script` after `greeting`, then records whatever else arrives until EOF.
fn scripted(
    greeting: &'static str,
    script: Vec<(&'static str, &'static str)>,
) -> impl FnOnce(TcpStream) -> Received + Send + 'static {
    move |stream| {
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut received = Vec::new();
        writer.write_all(greeting.as_bytes())?;
        writer.flush()?;
        for (expected, response) in script {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(received);
            }
            assert!(
                line.starts_with(expected),
                "expected command starting with '{expected}', got '{line}'"
            );
            received.push(line.trim_end().to_string());
            writer.write_all(response.as_bytes())?;
            writer.flush()?;
        }
        drain(&mut reader, &mut received)?;
        Ok(received)
    }
}

/// Never says a word; just records what the client sends until it hangs up.
fn silent() -> impl FnOnce(TcpStream) -> Received + Send + 'static {
    |stream| {
        let mut reader = BufReader::new(stream);
        let mut received = Vec::new();
        drain(&mut reader, &mut received)?;
        Ok(received)
    }
}

fn drain(reader: &mut BufReader<TcpStream>, received: &mut Vec<String>) -> io::Result<()> {
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => return Ok(()),
            Ok(_) => received.push(line.trim_end().to_string()),
            Err(err) if err.kind() == io::ErrorKind::ConnectionReset => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

fn loopback_probe(port: u16) -> SmtpProbe<StubResolver> {
    let resolver = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(MxStatus::Records(vec![MxRecord::new(10, "127.0.0.1")]))
    });
    let options = SmtpProbeOptions {
        port,
        ..SmtpProbeOptions::default()
    };
    SmtpProbe::new(resolver, options)
}

const HAPPY_PATH: [(&str, &str); 4] = [
    ("HELO example.com", "250 mock.example\r\n"),
    ("MAIL FROM:<verify@example.com>", "250 2.1.0 Ok\r\n"),
    ("RCPT TO:<user@example.com>", "250 2.1.5 Ok\r\n"),
    ("QUIT", "221 2.0.0 Bye\r\n"),
];

#[test]
fn accepted_recipient_is_reported_and_no_data_is_sent() {
    let (port, handle) = spawn_server(scripted("220 mock.smtp.test ESMTP\r\n", HAPPY_PATH.to_vec()));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_accepted(), "unexpected outcome: {outcome:?}");
    assert_eq!(outcome.message(), "SMTP verification successful");

    let received = handle.join().expect("server thread").expect("server io");
    assert_eq!(
        received,
        vec![
            "HELO example.com",
            "MAIL FROM:<verify@example.com>",
            "RCPT TO:<user@example.com>",
            "QUIT",
        ]
    );
}

#[test]
fn rejected_recipient_carries_the_code() {
    let (port, handle) = spawn_server(scripted(
        "220 mock.smtp.test ESMTP\r\n",
        vec![
            ("HELO", "250 mock.example\r\n"),
            ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:", "550 5.1.1 User unknown\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ],
    ));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_rejected());
    assert_eq!(outcome.reply().map(|reply| reply.code), Some(550));
    assert_eq!(outcome.message(), "SMTP returned code 550: 5.1.1 User unknown");
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn service_closing_on_recipient_is_indeterminate() {
    let (port, handle) = spawn_server(scripted(
        "220 mock.smtp.test ESMTP\r\n",
        vec![
            ("HELO", "250 mock.example\r\n"),
            ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:", "421 4.7.0 Try again later\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ],
    ));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_indeterminate());
    assert_eq!(outcome.message(), "SMTP error: 421");
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn multiline_greeting_is_accepted() {
    let (port, handle) = spawn_server(scripted(
        "220-mock.smtp.test ESMTP\r\n220 no UCE\r\n",
        HAPPY_PATH.to_vec(),
    ));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_accepted());
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn refused_greeting_is_indeterminate() {
    let (port, handle) = spawn_server(scripted(
        "554 5.7.1 no service for you\r\n",
        vec![("QUIT", "221 2.0.0 Bye\r\n")],
    ));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_indeterminate());
    assert_eq!(outcome.message(), "SMTP error: 554");
    let received = handle.join().expect("server thread").expect("server io");
    assert!(!received.iter().any(|line| line.starts_with("RCPT")));
}

#[test]
fn malformed_reply_is_indeterminate() {
    let (port, handle) = spawn_server(scripted(
        "220 mock.smtp.test ESMTP\r\n",
        vec![
            ("HELO", "hello there\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ],
    ));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_indeterminate());
    assert!(
        outcome.message().starts_with("Unexpected SMTP response"),
        "unexpected message: {}",
        outcome.message()
    );
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn stalled_server_times_out() {
    let (port, handle) = spawn_server(silent());
    let started = Instant::now();
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_millis(300))
        .expect("probe");

    assert!(outcome.is_indeterminate());
    assert_eq!(outcome.message(), "SMTP connection timeout");
    assert!(started.elapsed() < Duration::from_secs(3));
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn unbounded_timeout_is_clamped() {
    let (port, handle) = spawn_server(scripted("220 mock.smtp.test ESMTP\r\n", HAPPY_PATH.to_vec()));
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::MAX)
        .expect("probe");

    assert!(outcome.is_accepted(), "unexpected outcome: {outcome:?}");
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn cancellation_interrupts_a_pending_connect() {
    // TEST-NET-1 is never routed: the handshake either hangs or fails right away
    let token = CancellationToken::new();
    let probe = SmtpProbe::new(
        StubResolver::records(vec![MxRecord::new(10, "192.0.2.1")]),
        SmtpProbeOptions {
            cancel: Some(token.clone()),
            ..SmtpProbeOptions::default()
        },
    );

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        token.cancel();
    });
    let started = Instant::now();
    let outcome = probe
        .probe("user@example.com", Duration::from_secs(30))
        .expect("probe");

    assert!(outcome.is_indeterminate(), "unexpected outcome: {outcome:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    canceller.join().expect("canceller thread");
}

#[test]
fn server_hanging_up_is_indeterminate() {
    let (port, handle) = spawn_server(|stream| {
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        writer.write_all(b"220 mock.smtp.test ESMTP\r\n")?;
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(vec![line.trim_end().to_string()])
    });
    let outcome = loopback_probe(port)
        .probe("user@example.com", Duration::from_secs(5))
        .expect("probe");

    assert!(outcome.is_indeterminate());
    assert_eq!(outcome.message(), "SMTP server disconnected");
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn cancellation_aborts_an_in_flight_probe() {
    let (port, handle) = spawn_server(silent());
    let token = CancellationToken::new();
    let probe = SmtpProbe::new(
        StubResolver::records(vec![MxRecord::new(10, "127.0.0.1")]),
        SmtpProbeOptions {
            port,
            cancel: Some(token.clone()),
            ..SmtpProbeOptions::default()
        },
    );

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        token.cancel();
    });
    let started = Instant::now();
    let outcome = probe
        .probe("user@example.com", Duration::from_secs(30))
        .expect("probe");

    assert!(outcome.is_indeterminate());
    assert_eq!(outcome.message(), "SMTP probe cancelled");
    assert!(started.elapsed() < Duration::from_secs(5));
    canceller.join().expect("canceller thread");
    handle.join().expect("server thread").expect("server io");
}

#[test]
fn domain_without_mx_is_an_error() {
    let probe = SmtpProbe::new(
        StubResolver::answer(MxStatus::NoRecords),
        SmtpProbeOptions::default(),
    );
    let err = probe
        .probe("user@example.com", Duration::from_secs(1))
        .expect_err("no MX");
    assert!(matches!(err, SmtpProbeError::NoMailExchanger { ref domain } if domain == "example.com"));
}

#[test]
fn address_without_domain_is_invalid() {
    let probe = SmtpProbe::new(
        StubResolver::new(|_| panic!("resolver must not be queried")),
        SmtpProbeOptions::default(),
    );
    for address in ["user", "user@", "@example.com"] {
        let err = probe
            .probe(address, Duration::from_secs(1))
            .expect_err("invalid address");
        assert!(matches!(err, SmtpProbeError::InvalidAddress { .. }));
    }
}

#[test]
fn resolver_timeout_before_probe_is_indeterminate() {
    let probe = SmtpProbe::new(StubResolver::timing_out(), SmtpProbeOptions::default());
    let outcome = probe
        .probe("user@example.com", Duration::from_secs(1))
        .expect("probe");
    assert!(outcome.is_indeterminate());
    assert!(outcome.message().starts_with("Verification error"));
}
