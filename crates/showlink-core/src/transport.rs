//! Fan-out of outbound messages to the configured show controllers.

use crate::command::{OutboundMessage, Target};
use crate::error::{Error, Result};
use crate::osc::OscClient;

/// Anything that can deliver an [`OutboundMessage`].
pub trait OscOutput: Send {
    fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// One client per configured remote. Explicit `host:port` targets are sent
/// from the first remote's socket.
#[derive(Debug)]
pub struct RemoteSet {
    remotes: Vec<OscClient>,
}

impl RemoteSet {
    pub fn new(addrs: &[String]) -> Result<Self> {
        if addrs.is_empty() {
            return Err(Error::Config("no show controller address configured".into()));
        }
        let remotes = addrs
            .iter()
            .map(|addr| OscClient::new(addr.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { remotes })
    }

    /// Remote addresses in configuration order.
    pub fn addrs(&self) -> Vec<&str> {
        self.remotes.iter().map(|c| c.addr.as_str()).collect()
    }

    fn send_all(&self, message: &OutboundMessage) -> Result<()> {
        let packet = message.to_packet();
        let mut last_err = None;
        let mut delivered = 0;
        for client in &self.remotes {
            match client.send_packet(&packet) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::warn!("[OSC] {} to {} failed: {}", message.addr, client.addr, e);
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }

    fn send_explicit(&self, addr: &str, message: &OutboundMessage) -> Result<()> {
        let client = self
            .remotes
            .first()
            .ok_or_else(|| Error::Config("no show controller address configured".into()))?;
        client.retarget(addr).send_packet(&message.to_packet())
    }
}

impl OscOutput for RemoteSet {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        log::trace!("[OSC] -> {} {:?}", message.addr, message.args);
        match &message.target {
            Target::AllRemotes => self.send_all(message),
            Target::Explicit(addr) => self.send_explicit(addr, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::OscListener;
    use rosc::OscType;
    use std::time::Duration;

    #[test]
    fn test_requires_a_remote() {
        assert!(RemoteSet::new(&[]).unwrap_err().is_config());
    }

    #[test]
    fn test_sends_to_every_remote() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let a = OscListener::bind("127.0.0.1:0", tx.clone()).unwrap();
        let b = OscListener::bind("127.0.0.1:0", tx).unwrap();
        let remotes =
            RemoteSet::new(&[a.local_addr().to_string(), b.local_addr().to_string()]).unwrap();

        remotes
            .send(&OutboundMessage::new("/global/play", vec![]))
            .unwrap();
        for _ in 0..2 {
            let message = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(message.addr, "/global/play");
            assert!(matches!(&message.args[..], [OscType::String(tag)] if tag.starts_with("uuid=")));
        }
        a.close();
        b.close();
    }

    #[test]
    fn test_partial_failure_is_ok() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let good = OscListener::bind("127.0.0.1:0", tx).unwrap();
        let remotes =
            RemoteSet::new(&["not-an-address".to_string(), good.local_addr().to_string()])
                .unwrap();

        assert!(remotes
            .send(&OutboundMessage::new("/global/stop", vec![]))
            .is_ok());
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        good.close();
    }

    #[test]
    fn test_total_failure_is_error() {
        let remotes = RemoteSet::new(&["not-an-address".to_string()]).unwrap();
        let err = remotes
            .send(&OutboundMessage::new("/global/stop", vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::Send { .. }));
    }

    #[test]
    fn test_explicit_target() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let other = OscListener::bind("127.0.0.1:0", tx).unwrap();
        let remotes = RemoteSet::new(&["127.0.0.1:9".to_string()]).unwrap();

        let mut message = OutboundMessage::new("/mixer/fader", vec![OscType::Float(0.5)]);
        message.target = Target::Explicit(other.local_addr().to_string());
        remotes.send(&message).unwrap();

        let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(received.addr, "/mixer/fader");

        // a second target reuses the same socket instead of binding one
        let (tx, rx) = crossbeam_channel::unbounded();
        let third = OscListener::bind("127.0.0.1:0", tx).unwrap();
        message.target = Target::Explicit(third.local_addr().to_string());
        remotes.send(&message).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        other.close();
        third.close();
    }
}
