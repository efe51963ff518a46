//! TCP backlog introspection for Linux.
//!
//! Given an open TCP socket descriptor, this crate performs a single
//! `getsockopt(IPPROTO_TCP, TCP_INFO)` read and projects the kernel's
//! backlog counters into a [`BacklogSnapshot`]. One read per call, no
//! polling, no caching: the snapshot is whatever the kernel reported at
//! that instant.
//!
//! The [`SocketBacklog`] extension trait exposes the query as methods on
//! anything that implements [`std::os::fd::AsRawFd`], in two flavors:
//!
//! - [`SocketBacklog::socket_backlog`] returns `None` on any query failure
//! - [`SocketBacklog::try_socket_backlog`] surfaces the OS error unchanged
//!
//! # Example
//!
//! ```ignore
//! use std::net::TcpListener;
//! use tcpq::SocketBacklog;
//!
//! let listener = TcpListener::bind("127.0.0.1:80")?;
//! let snapshot = listener.try_socket_backlog()?;
//! println!(
//!     "{} pending of {} allowed",
//!     snapshot.backlog_size, snapshot.backlog_max_size
//! );
//! ```
//!
//! # Counter semantics
//!
//! The two counters come from `tcpi_unacked` and `tcpi_sacked`. For sockets
//! in `LISTEN` state the kernel reuses these fields for the accept-queue
//! depth and its configured limit, which is what makes them useful for
//! watching how full a server's pending-connection queue is. For
//! established connections they are segment counters. The crate copies both
//! fields as reported and attaches no further meaning to them.
//!
//! # Platform support
//!
//! `TCP_INFO` with this layout is Linux-specific, so the entire API exists
//! only on Linux. On other targets the crate compiles to an empty library
//! and none of the operations are present.

#[cfg(target_os = "linux")]
mod backlog;
#[cfg(target_os = "linux")]
mod error;
#[cfg(target_os = "linux")]
mod info;

#[cfg(target_os = "linux")]
pub use backlog::{BacklogSnapshot, SocketBacklog, query};
#[cfg(target_os = "linux")]
pub use error::{Error, Result};
