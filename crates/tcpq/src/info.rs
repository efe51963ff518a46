//! Fixed-layout view of the kernel's `struct tcp_info`.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};

/// Leading fields of `struct tcp_info` (linux/tcp.h), up to and including
/// `tcpi_sacked`.
///
/// The kernel only appends to `tcp_info`, so this prefix is stable across
/// kernel versions while the full struct keeps growing. A query asks for the
/// full size and parses whatever length the kernel actually wrote, as long
/// as it covers the prefix.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub(crate) struct TcpInfoSlice {
    /// Connection state (TCP_ESTABLISHED, TCP_LISTEN, ...).
    pub state: u8,
    /// Congestion avoidance state.
    pub ca_state: u8,
    /// Retransmit count.
    pub retransmits: u8,
    /// Zero window probe count.
    pub probes: u8,
    /// RTO backoff.
    pub backoff: u8,
    /// Negotiated TCP options.
    pub options: u8,
    /// Send/receive window scale (packed nibbles).
    pub wscale: u8,
    /// Delivery-rate/fastopen flag bits.
    pub flags: u8,

    /// Retransmit timeout (usec).
    pub rto: u32,
    /// Delayed ACK timeout (usec).
    pub ato: u32,
    /// Send MSS.
    pub snd_mss: u32,
    /// Receive MSS.
    pub rcv_mss: u32,

    /// Unacked count; accept-queue depth for LISTEN sockets.
    pub unacked: u32,
    /// Sacked count; accept-queue limit for LISTEN sockets.
    pub sacked: u32,
}

impl TcpInfoSlice {
    /// Parse the prefix out of a kernel-filled buffer.
    ///
    /// Copies rather than borrowing: the caller's buffer carries no
    /// alignment guarantee and the prefix is 32 bytes of plain data.
    pub(crate) fn read(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(slice, _)| slice)
            .map_err(|_| Error::Truncated {
                expected: size_of::<Self>(),
                actual: data.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_layout() {
        // Eight u8 fields, then six u32 fields, no padding.
        assert_eq!(size_of::<TcpInfoSlice>(), 32);

        let info = TcpInfoSlice {
            unacked: 7,
            sacked: 128,
            ..Default::default()
        };
        let bytes = info.as_bytes();
        assert_eq!(&bytes[24..28], &7u32.to_ne_bytes());
        assert_eq!(&bytes[28..32], &128u32.to_ne_bytes());
    }

    #[test]
    fn test_read_from_full_struct() {
        // A modern kernel returns far more than the prefix; extra bytes
        // must be ignored.
        let mut buf = [0u8; 232];
        buf[0] = 10; // TCP_LISTEN
        buf[24..28].copy_from_slice(&3u32.to_ne_bytes());
        buf[28..32].copy_from_slice(&13u32.to_ne_bytes());

        let info = TcpInfoSlice::read(&buf).unwrap();
        assert_eq!(info.state, 10);
        assert_eq!(info.unacked, 3);
        assert_eq!(info.sacked, 13);
    }

    #[test]
    fn test_read_exact_prefix() {
        let mut buf = [0u8; 32];
        buf[24..28].copy_from_slice(&1u32.to_ne_bytes());
        buf[28..32].copy_from_slice(&2u32.to_ne_bytes());

        let info = TcpInfoSlice::read(&buf).unwrap();
        assert_eq!(info.unacked, 1);
        assert_eq!(info.sacked, 2);
    }

    #[test]
    fn test_read_rejects_short_buffer() {
        let buf = [0u8; 8];
        let err = TcpInfoSlice::read(&buf).unwrap_err();
        match err {
            Error::Truncated { expected, actual } => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 8);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
