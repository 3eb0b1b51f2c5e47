//! Captive portal DNS responder
//!
//! Answers every A query with the access point address, so that any hostname
//! typed on an associated client lands on the control page.

use std::net::{Ipv4Addr, SocketAddr};

use futures::Future;
use tokio::net::UdpSocket;

use crate::models::DnsConfig;

const MAX_DATAGRAM: usize = 512;

/// Answer TTL, in seconds
const TTL: u32 = 60;

/// Bind the DNS responder, returning the future serving it
pub async fn bind(
    config: &DnsConfig,
    address: Ipv4Addr,
) -> Result<impl Future<Output = ()>, std::io::Error> {
    let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?;
    let rdata = address.octets();

    info!(port = %config.port, address = %address, "captive dns responder listening");

    Ok(async move {
        let mut buf = [0u8; MAX_DATAGRAM];

        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, peer)) => match build_response(&buf[..len], rdata) {
                    Some(response) => {
                        trace!(peer = %peer, "answering dns query");

                        if let Err(error) = socket.send_to(&response, peer).await {
                            warn!(peer = %peer, error = %error, "error sending dns answer");
                        }
                    }
                    None => {
                        debug!(peer = %peer, "ignoring malformed dns query");
                    }
                },
                Err(error) => {
                    warn!(error = %error, "dns recv error");
                }
            }
        }
    })
}

/// Build a one-answer response to `query`, pointing at `rdata`
///
/// Returns None when the datagram is not a well-formed query.
fn build_response(query: &[u8], rdata: [u8; 4]) -> Option<Vec<u8>> {
    // Header is 12 bytes
    if query.len() < 12 {
        return None;
    }

    // QR bit set means this is a response, not a query
    if query[2] & 0x80 != 0 {
        return None;
    }

    let qdcount = u16::from_be_bytes([query[4], query[5]]);
    if qdcount == 0 {
        return None;
    }

    // Walk the first question: labels, terminator, QTYPE and QCLASS
    let mut offset = 12;
    loop {
        let len = *query.get(offset)? as usize;
        offset += 1;

        if len == 0 {
            break;
        }

        // Compression pointers do not occur in queries
        if len & 0xC0 != 0 {
            return None;
        }

        offset += len;
    }

    offset += 4;
    if offset > query.len() {
        return None;
    }

    let question = &query[12..offset];

    let mut response = Vec::with_capacity(12 + question.len() + 16);

    // Header: same ID, standard response, recursion available, one answer
    response.extend_from_slice(&query[..2]);
    response.extend_from_slice(&[0x81, 0x80]);
    response.extend_from_slice(&[0x00, 0x01]);
    response.extend_from_slice(&[0x00, 0x01]);
    response.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    response.extend_from_slice(question);

    // Answer: pointer to the question name, type A, class IN
    response.extend_from_slice(&[0xC0, 0x0C]);
    response.extend_from_slice(&[0x00, 0x01]);
    response.extend_from_slice(&[0x00, 0x01]);
    response.extend_from_slice(&TTL.to_be_bytes());
    response.extend_from_slice(&[0x00, 0x04]);
    response.extend_from_slice(&rdata);

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: [u8; 4] = [192, 168, 1, 1];

    /// A query for "lamp.local", type A, class IN
    fn query() -> Vec<u8> {
        let mut query = vec![
            0x12, 0x34, // ID
            0x01, 0x00, // RD
            0x00, 0x01, // QDCOUNT
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        query.extend_from_slice(b"\x04lamp\x05local\x00");
        query.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        query
    }

    #[test]
    fn answers_with_the_portal_address() {
        let query = query();
        let response = build_response(&query, ADDRESS).unwrap();

        // Same transaction id
        assert_eq!(&response[..2], &query[..2]);
        // Response flags, one question, one answer
        assert_eq!(&response[2..8], &[0x81, 0x80, 0x00, 0x01, 0x00, 0x01]);
        // Question echoed back
        assert_eq!(&response[12..12 + 16], &query[12..]);
        // Answer ends with the A record data
        assert_eq!(&response[response.len() - 4..], &ADDRESS);
        assert_eq!(
            &response[response.len() - 6..response.len() - 4],
            &[0x00, 0x04]
        );
    }

    #[test]
    fn short_datagrams_are_ignored() {
        assert!(build_response(&[0x12, 0x34, 0x01], ADDRESS).is_none());
        assert!(build_response(&[], ADDRESS).is_none());
    }

    #[test]
    fn truncated_questions_are_ignored() {
        let query = query();
        assert!(build_response(&query[..query.len() - 3], ADDRESS).is_none());
    }

    #[test]
    fn responses_are_ignored() {
        let mut query = query();
        query[2] |= 0x80;
        assert!(build_response(&query, ADDRESS).is_none());
    }

    #[test]
    fn empty_question_counts_are_ignored() {
        let mut query = query();
        query[5] = 0;
        assert!(build_response(&query, ADDRESS).is_none());
    }
}
