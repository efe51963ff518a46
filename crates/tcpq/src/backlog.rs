//! Backlog counters and the TCP_INFO query.

use std::os::fd::{AsRawFd, RawFd};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::{Error, Result};
use super::info::TcpInfoSlice;

/// Kernel backlog counters for one TCP socket, from a single TCP_INFO read.
///
/// Both fields are copied verbatim from adjacent counters of the same
/// kernel query, so a snapshot is always internally consistent. For sockets
/// in `LISTEN` state the kernel reports the accept-queue depth and its
/// configured limit here; for established connections they are the
/// unacked/selectively-acked segment counts. No further meaning is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogSnapshot {
    /// Units currently pending on the socket (`tcpi_unacked`).
    pub backlog_size: u32,
    /// Companion limit counter (`tcpi_sacked`).
    pub backlog_max_size: u32,
}

impl BacklogSnapshot {
    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.backlog_size == 0
    }

    /// Format as `size/max`, the way `ss` prints queue pairs.
    pub fn format_queue(&self) -> String {
        format!("{}/{}", self.backlog_size, self.backlog_max_size)
    }
}

/// Query the kernel's TCP statistics for `fd` and extract the backlog
/// counters.
///
/// Performs exactly one `getsockopt(IPPROTO_TCP, TCP_INFO)` call. The read
/// is side-effect free and does not touch the socket's buffers, options, or
/// pending queue. The descriptor stays owned by the caller; it is never
/// closed or duplicated here, and its validity is the caller's
/// responsibility. A stale or non-socket descriptor fails with the OS
/// errno preserved in [`Error::Sockopt`].
pub fn query(fd: RawFd) -> Result<BacklogSnapshot> {
    let mut buf = [0u8; size_of::<libc::tcp_info>()];
    let mut len = buf.len() as libc::socklen_t;

    // SAFETY: buf is a valid writable region of `len` bytes; the kernel
    // writes at most `len` bytes and stores the written length back in
    // `len`. A bad fd is rejected by the kernel, not dereferenced.
    let rc = unsafe {
        libc::getsockopt(
            fd,
            libc::IPPROTO_TCP,
            libc::TCP_INFO,
            buf.as_mut_ptr().cast(),
            &mut len,
        )
    };
    if rc != 0 {
        let err = Error::last_sockopt_error();
        trace!(fd, error = %err, "TCP_INFO query failed");
        return Err(err);
    }

    let info = TcpInfoSlice::read(&buf[..len as usize])?;
    let snapshot = BacklogSnapshot {
        backlog_size: info.unacked,
        backlog_max_size: info.sacked,
    };
    trace!(
        fd,
        size = snapshot.backlog_size,
        max = snapshot.backlog_max_size,
        "TCP_INFO query"
    );
    Ok(snapshot)
}

/// Backlog introspection for socket types.
///
/// Blanket-implemented for everything that exposes a raw descriptor, so
/// `std::net::TcpListener` and `TcpStream` get both methods for free. The
/// two methods run the same single-shot [`query`]; they differ only in how
/// a kernel failure is surfaced.
///
/// ```ignore
/// use std::net::TcpListener;
/// use tcpq::SocketBacklog;
///
/// let listener = TcpListener::bind("127.0.0.1:0")?;
/// if let Some(snapshot) = listener.socket_backlog() {
///     println!("accept queue: {}", snapshot.format_queue());
/// }
/// ```
pub trait SocketBacklog: AsRawFd {
    /// Snapshot the backlog counters, or `None` if the kernel query fails.
    ///
    /// No error detail is retained; use [`try_socket_backlog`] to see the
    /// cause.
    ///
    /// [`try_socket_backlog`]: SocketBacklog::try_socket_backlog
    fn socket_backlog(&self) -> Option<BacklogSnapshot> {
        query(self.as_raw_fd()).ok()
    }

    /// Snapshot the backlog counters, surfacing the OS error unchanged on
    /// failure.
    fn try_socket_backlog(&self) -> Result<BacklogSnapshot> {
        query(self.as_raw_fd())
    }
}

impl<T: AsRawFd> SocketBacklog for T {}
