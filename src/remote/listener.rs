use super::protocol::{execute, parse_command, RemoteCommand, RemoteResponse};
use super::RemoteTarget;
use crate::system::config::RpcConfig;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

/// Commands served per client on each poll; the rest wait for the next frame
const MAX_LINES_PER_POLL: usize = 32;

/// Bytes read per client on each poll
const MAX_READ_PER_POLL: usize = 64 * 1024;

/// An accepted connection and whatever partial line it has sent so far
struct Client {
    stream: TcpStream,
    addr: SocketAddr,
    pending: Vec<u8>,
    closed: bool,
}

impl Client {
    fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            stream,
            addr,
            pending: Vec::new(),
            closed: false,
        }
    }

    /// Drain whatever the socket has ready without blocking
    fn fill(&mut self) -> Result<(), std::io::Error> {
        let mut chunk = [0u8; 4096];
        let mut total = 0;
        while total < MAX_READ_PER_POLL {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    total += n;
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Next complete line. A trailing unterminated line counts once the peer has closed.
    fn next_line(&mut self) -> Option<String> {
        let end = match self.pending.iter().position(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None if self.closed && !self.pending.is_empty() => self.pending.len(),
            None => return None,
        };
        let line: Vec<u8> = self.pending.drain(..end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    fn reply(&mut self, response: &RemoteResponse) -> Result<(), std::io::Error> {
        let mut json = serde_json::to_string(response).map_err(std::io::Error::other)?;
        json.push('\n');
        self.stream.write_all(json.as_bytes())?;
        self.stream.flush()
    }

    fn finished(&self) -> bool {
        self.closed && self.pending.is_empty()
    }
}

/// Loopback listener polled from the event loop.
///
/// Nothing is bound until [`RpcListener::start`] is called. Accepted
/// connections stay open across polls and are never read in blocking mode.
#[derive(Default)]
pub struct RpcListener {
    config: RpcConfig,
    listener: Option<TcpListener>,
    clients: Vec<Client>,
}

impl RpcListener {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            config,
            listener: None,
            clients: Vec::new(),
        }
    }

    pub fn start(&mut self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.address())?;
        listener.set_nonblocking(true)?;

        log::info!("Remote control listening on {}", listener.local_addr()?);
        self.listener = Some(listener);
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Accept pending connections and serve what the clients have already sent.
    ///
    /// Quit requests reach the application through [`RemoteTarget::request_quit`].
    pub fn handle_connections<T: RemoteTarget + ?Sized>(&mut self, target: &mut T) -> Result<(), std::io::Error> {
        let Some(listener) = self.listener.as_ref() else {
            return Ok(());
        };

        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    log::debug!("Remote connection from {}", addr);
                    stream.set_nonblocking(true)?;
                    self.clients.push(Client::new(stream, addr));
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        let mut quit = false;
        self.clients.retain_mut(|client| {
            if quit {
                return true;
            }
            match serve_client(client, &mut *target) {
                Ok(asked_to_quit) => {
                    quit = asked_to_quit;
                    if client.finished() {
                        log::debug!("Remote client {} disconnected", client.addr);
                        return false;
                    }
                    true
                }
                Err(e) => {
                    log::warn!("Dropping remote client {}: {}", client.addr, e);
                    false
                }
            }
        });

        Ok(())
    }
}

/// Serve up to [`MAX_LINES_PER_POLL`] buffered commands. Returns true after a quit.
fn serve_client<T: RemoteTarget + ?Sized>(client: &mut Client, target: &mut T) -> Result<bool, std::io::Error> {
    client.fill()?;

    let mut served = 0;
    while served < MAX_LINES_PER_POLL {
        let Some(line) = client.next_line() else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        served += 1;

        let (response, is_quit) = match parse_command(&line) {
            Ok(cmd) => {
                log::info!("Remote command: {:?}", cmd);
                let is_quit = matches!(cmd, RemoteCommand::Quit { .. });
                (execute(cmd, target), is_quit)
            }
            Err(message) => {
                log::warn!("Rejected remote command: {}", message);
                (RemoteResponse::Error { message }, false)
            }
        };
        client.reply(&response)?;

        if is_quit {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::protocol::tests::FakeTarget;
    use std::io::{BufRead, BufReader};
    use std::time::{Duration, Instant};

    fn ephemeral_listener() -> RpcListener {
        let mut listener = RpcListener::new(RpcConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        });
        listener.start().unwrap();
        listener
    }

    fn send(addr: SocketAddr, payload: &str) -> TcpStream {
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(payload.as_bytes()).unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();
        client
    }

    /// Poll until the client has been served and its connection closed
    fn serve(listener: &mut RpcListener, target: &mut FakeTarget) {
        let mut seen = false;
        for _ in 0..200 {
            listener.handle_connections(&mut *target).unwrap();
            seen |= !listener.clients.is_empty() || !target.files.is_empty() || target.quit.is_some();
            if seen && listener.clients.is_empty() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_not_listening_before_start() {
        let mut listener = RpcListener::default();
        assert!(listener.local_addr().is_none());
        let mut target = FakeTarget::default();
        listener.handle_connections(&mut target).unwrap();
        assert!(target.quit.is_none());
    }

    #[test]
    fn test_no_pending_connection() {
        let mut listener = ephemeral_listener();
        let mut target = FakeTarget::default();
        listener.handle_connections(&mut target).unwrap();
        assert!(listener.clients.is_empty());
        assert!(target.files.is_empty());
    }

    #[test]
    fn test_open_file_and_list() {
        let mut listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let mut client = send(addr, "{\"type\":\"open_file\",\"path\":\"a.xyz\"}\n{\"type\":\"list_files\"}\n");

        let mut target = FakeTarget::default();
        serve(&mut listener, &mut target);
        assert_eq!(target.files, vec!["a.xyz"]);
        assert!(target.quit.is_none());

        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines, vec![r#"{"type":"ok"}"#, r#"{"type":"files","files":["a.xyz"]}"#]);
    }

    #[test]
    fn test_quit_reaches_target() {
        let mut listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let mut client = send(addr, "{\"type\":\"quit\",\"code\":4}\n");

        let mut target = FakeTarget::default();
        serve(&mut listener, &mut target);
        assert_eq!(target.quit, Some(4));
        assert!(target.files.is_empty());

        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        assert_eq!(reply, "{\"type\":\"ok\"}\n");
    }

    #[test]
    fn test_invalid_json_gets_error_response() {
        let mut listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let mut client = send(addr, "garbage\n{\"type\":\"quit\"}\n");

        let mut target = FakeTarget::default();
        serve(&mut listener, &mut target);
        assert_eq!(target.quit, Some(0));

        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        let first: RemoteResponse = serde_json::from_str(reply.lines().next().unwrap()).unwrap();
        assert!(first.is_error());
    }

    #[test]
    fn test_unterminated_last_line_is_served_on_close() {
        let mut listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let mut client = send(addr, "{\"type\":\"open_file\",\"path\":\"b.xyz\"}");

        let mut target = FakeTarget::default();
        serve(&mut listener, &mut target);
        assert_eq!(target.files, vec!["b.xyz"]);

        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        assert_eq!(reply, "{\"type\":\"ok\"}\n");
    }

    #[test]
    fn test_burst_is_spread_over_polls() {
        let mut listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let burst = "{\"type\":\"ping\"}\n".repeat(MAX_LINES_PER_POLL * 2);
        let mut client = send(addr, &burst);

        let mut target = FakeTarget::default();
        serve(&mut listener, &mut target);

        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        assert_eq!(reply.lines().count(), MAX_LINES_PER_POLL * 2);
    }

    #[test]
    fn test_trickling_client_does_not_stall_poll() {
        const PINGS: usize = 15;
        let mut listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let writer = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            for _ in 0..PINGS {
                stream.write_all(b"{\"type\":\"ping\"}\n").unwrap();
                std::thread::sleep(Duration::from_millis(20));
            }
            stream.shutdown(std::net::Shutdown::Write).unwrap();
            BufReader::new(stream).lines().count()
        });

        let mut target = FakeTarget::default();
        let mut slowest = Duration::ZERO;
        let deadline = Instant::now() + Duration::from_secs(5);
        while !writer.is_finished() && Instant::now() < deadline {
            let started = Instant::now();
            listener.handle_connections(&mut target).unwrap();
            slowest = slowest.max(started.elapsed());
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(slowest < Duration::from_millis(50), "poll took {:?}", slowest);
        assert_eq!(writer.join().unwrap(), PINGS);
    }
}
