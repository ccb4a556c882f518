//! SSDP (Simple Service Discovery Protocol) search over UDP multicast
//!
//! Internal to the crate. [`crate::discovery`] drives the client and turns the
//! responses into device handles.

use crate::error::{DiscoveryError, Result};
use tokio::net::UdpSocket;
use tokio::time::Instant;

const SSDP_MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Search target answered by Sonos zone players
pub(crate) const ZONE_PLAYER_TARGET: &str = "urn:schemas-upnp-org:device:ZonePlayer:1";

/// Parsed headers of one SSDP search response
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub search_target: String,
    pub usn: String,
    pub server: Option<String>,
}

impl SsdpResponse {
    /// Cheap pre-filter applied before any HTTP traffic is spent on a responder
    pub fn is_likely_sonos(&self) -> bool {
        self.search_target.contains("ZonePlayer")
            || self.usn.contains("RINCON")
            || self
                .server
                .as_deref()
                .is_some_and(|server| server.to_lowercase().contains("sonos"))
    }
}

/// Async SSDP client owning one UDP socket
pub(crate) struct SsdpClient {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl SsdpClient {
    /// Bind an ephemeral UDP socket suitable for multicast search
    pub async fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| DiscoveryError::Network(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::Network(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self {
            socket,
            buffer: vec![0; 2048],
        })
    }

    /// Multicast an M-SEARCH request for `search_target`
    pub async fn search(&self, search_target: &str) -> Result<()> {
        let request = m_search_request(search_target);
        self.socket
            .send_to(request.as_bytes(), SSDP_MULTICAST_ADDR)
            .await
            .map_err(|e| DiscoveryError::Network(format!("Failed to send M-SEARCH: {}", e)))?;
        Ok(())
    }

    /// Wait for the next well-formed response, or `None` once `deadline` passes.
    ///
    /// Datagrams that are not valid UTF-8 or lack the required headers are
    /// skipped. A socket error ends the search as well.
    pub async fn next_response(&mut self, deadline: Instant) -> Option<SsdpResponse> {
        loop {
            let received =
                tokio::time::timeout_at(deadline, self.socket.recv_from(&mut self.buffer)).await;

            let size = match received {
                Ok(Ok((size, _))) => size,
                Ok(Err(e)) => {
                    tracing::debug!("SSDP socket error, ending search: {}", e);
                    return None;
                }
                Err(_) => return None,
            };

            if let Ok(text) = std::str::from_utf8(&self.buffer[..size]) {
                if let Some(response) = parse_ssdp_response(text) {
                    return Some(response);
                }
            }
        }
    }
}

fn m_search_request(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 2\r\n\
         ST: {}\r\n\
         USER-AGENT: sonos-bridge/0.1 UPnP/1.0\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, search_target
    )
}

/// Parse the headers of an SSDP response.
///
/// `LOCATION`, `ST` and `USN` are required; `SERVER` is optional.
pub(crate) fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut search_target = None;
    let mut usn = None;
    let mut server = None;

    for line in response.lines() {
        let Some((name, value)) = split_header(line) else {
            continue;
        };

        if name.eq_ignore_ascii_case("LOCATION") {
            location = Some(value);
        } else if name.eq_ignore_ascii_case("ST") {
            search_target = Some(value);
        } else if name.eq_ignore_ascii_case("USN") {
            usn = Some(value);
        } else if name.eq_ignore_ascii_case("SERVER") {
            server = Some(value);
        }
    }

    Some(SsdpResponse {
        location: location?,
        search_target: search_target?,
        usn: usn?,
        server,
    })
}

/// Split `NAME: value` into its trimmed parts
fn split_header(line: &str) -> Option<(&str, String)> {
    let (name, value) = line.trim().split_once(':')?;
    let name = name.trim_end();
    if name.is_empty() || name.contains(' ') {
        return None;
    }
    Some((name, value.trim().to_string()))
}
