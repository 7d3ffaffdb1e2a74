//! UDP plumbing for OSC.
//!
//! [`OscClient`] sends to one remote from an ephemeral port.
//! [`OscListener`] owns the local port the show controller pushes updates
//! to and forwards every decoded message over a channel from a background
//! thread.

use crossbeam_channel::Sender;
use rosc::{encoder, OscPacket, OscType};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{Error, Result};

/// How often the receive thread checks whether it should exit.
const RECV_POLL: Duration = Duration::from_millis(100);

/// Large enough for any setlist the controller sends in one packet.
const RECV_BUFFER: usize = 65_536;

/// UDP-based OSC client for one remote.
#[derive(Clone)]
pub struct OscClient {
    /// The underlying UDP socket, shared by retargeted clones.
    sock: Arc<UdpSocket>,
    /// Target address in "host:port" format.
    pub addr: String,
}

impl OscClient {
    /// Create a new client targeting `addr`, bound to an ephemeral port.
    pub fn new<A: Into<String>>(addr: A) -> Result<Self> {
        let sock = UdpSocket::bind("0.0.0.0:0").map_err(|source| Error::Bind {
            addr: "0.0.0.0:0".to_string(),
            source,
        })?;
        Ok(Self {
            sock: Arc::new(sock),
            addr: addr.into(),
        })
    }

    /// A client for `addr` that sends from this client's socket.
    pub fn retarget<A: Into<String>>(&self, addr: A) -> Self {
        Self {
            sock: Arc::clone(&self.sock),
            addr: addr.into(),
        }
    }

    /// Send an OSC message with the given path and arguments.
    pub fn send_msg(&self, path: &str, args: Vec<OscType>) -> Result<()> {
        self.send_packet(&Self::msg(path, args))
    }

    /// Send an already built packet.
    pub fn send_packet(&self, packet: &OscPacket) -> Result<()> {
        let buf = encoder::encode(packet)?;
        self.sock.send_to(&buf, &self.addr).map_err(|source| Error::Send {
            addr: self.addr.clone(),
            source,
        })?;
        Ok(())
    }

    /// Build a message packet.
    pub fn msg(path: &str, args: Vec<OscType>) -> OscPacket {
        OscPacket::Message(rosc::OscMessage {
            addr: path.into(),
            args,
        })
    }
}

impl std::fmt::Debug for OscClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscClient")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

/// A decoded inbound message. Bundles are flattened into these.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundMessage {
    pub addr: String,
    pub args: Vec<OscType>,
}

/// Append every message contained in `packet`, depth first.
pub fn flatten_packet(packet: OscPacket, out: &mut Vec<InboundMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(InboundMessage {
            addr: msg.addr,
            args: msg.args,
        }),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten_packet(inner, out);
            }
        }
    }
}

/// Listening socket with its receive thread.
pub struct OscListener {
    local_addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl OscListener {
    /// Bind `addr` and start forwarding decoded messages to `tx`.
    ///
    /// The thread ends when [`close`](Self::close) is called or when the
    /// receiving side of `tx` is dropped.
    pub fn bind(addr: &str, tx: Sender<InboundMessage>) -> Result<Self> {
        let bind_err = |source| Error::Bind {
            addr: addr.to_string(),
            source,
        };
        let sock = UdpSocket::bind(addr).map_err(bind_err)?;
        sock.set_read_timeout(Some(RECV_POLL)).map_err(bind_err)?;
        let local_addr = sock.local_addr().map_err(bind_err)?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let thread = thread::Builder::new()
            .name("showlink-osc-recv".to_string())
            .spawn(move || receive_loop(sock, tx, thread_stop))?;

        log::info!("[OSC] Listening on {}", local_addr);
        Ok(Self {
            local_addr,
            stop,
            thread: Some(thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the receive thread and release the port.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("[OSC] Receive thread panicked");
            }
            log::debug!("[OSC] Closed listener on {}", self.local_addr);
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for OscListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscListener")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

fn receive_loop(sock: UdpSocket, tx: Sender<InboundMessage>, stop: Arc<AtomicBool>) {
    let mut buf = vec![0u8; RECV_BUFFER];
    while !stop.load(Ordering::Relaxed) {
        let size = match sock.recv_from(&mut buf) {
            Ok((size, _)) => size,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                log::warn!("[OSC] Receive failed: {}", e);
                continue;
            }
        };
        let packet = match rosc::decoder::decode_udp(&buf[..size]) {
            Ok((_, packet)) => packet,
            Err(e) => {
                log::debug!("[OSC] Dropping undecodable packet: {:?}", e);
                continue;
            }
        };
        let mut messages = Vec::new();
        flatten_packet(packet, &mut messages);
        for message in messages {
            if tx.send(message).is_err() {
                return;
            }
        }
    }
}
