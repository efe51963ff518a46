//! Error types for backlog queries.

use std::io;

/// Result type for backlog queries.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when querying backlog counters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The kernel rejected the TCP_INFO query for this descriptor.
    ///
    /// The underlying errno is preserved exactly as `getsockopt` reported it.
    #[error("getsockopt(TCP_INFO): {source}")]
    Sockopt {
        /// The OS error from the failed syscall.
        #[source]
        source: io::Error,
    },

    /// Kernel wrote fewer bytes than the fixed `tcp_info` prefix.
    #[error("tcp_info truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum length the query consumes.
        expected: usize,
        /// Bytes the kernel actually wrote.
        actual: usize,
    },
}

impl Error {
    /// Capture the current errno as a query failure.
    pub(crate) fn last_sockopt_error() -> Self {
        Self::Sockopt {
            source: io::Error::last_os_error(),
        }
    }

    /// Get the raw OS error code, if the kernel reported one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Sockopt { source } => source.raw_os_error(),
            Self::Truncated { .. } => None,
        }
    }

    /// Check if the descriptor was not open (EBADF).
    pub fn is_invalid_descriptor(&self) -> bool {
        self.errno() == Some(libc::EBADF)
    }

    /// Check if the descriptor is open but not a socket (ENOTSOCK).
    pub fn is_not_socket(&self) -> bool {
        self.errno() == Some(libc::ENOTSOCK)
    }

    /// Check if the socket's family or protocol has no TCP_INFO
    /// (EOPNOTSUPP, ENOPROTOOPT).
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self.errno(),
            Some(libc::EOPNOTSUPP) | Some(libc::ENOPROTOOPT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sockopt_err(errno: i32) -> Error {
        Error::Sockopt {
            source: io::Error::from_raw_os_error(errno),
        }
    }

    #[test]
    fn test_errno_preserved() {
        let err = sockopt_err(libc::EBADF);
        assert_eq!(err.errno(), Some(libc::EBADF));
        assert!(err.is_invalid_descriptor());
        assert!(!err.is_not_socket());
    }

    #[test]
    fn test_not_socket() {
        let err = sockopt_err(libc::ENOTSOCK);
        assert!(err.is_not_socket());
        assert!(!err.is_invalid_descriptor());
    }

    #[test]
    fn test_unsupported() {
        assert!(sockopt_err(libc::EOPNOTSUPP).is_unsupported());
        assert!(sockopt_err(libc::ENOPROTOOPT).is_unsupported());
        assert!(!sockopt_err(libc::EBADF).is_unsupported());
    }

    #[test]
    fn test_sockopt_message_keeps_os_text() {
        let err = sockopt_err(libc::EBADF);
        let msg = err.to_string();
        assert!(msg.starts_with("getsockopt(TCP_INFO):"));
        assert!(msg.contains("os error 9") || msg.contains("Bad file descriptor"));
    }

    #[test]
    fn test_truncated_message() {
        let err = Error::Truncated {
            expected: 32,
            actual: 8,
        };
        assert_eq!(err.to_string(), "tcp_info truncated: expected 32 bytes, got 8");
        assert_eq!(err.errno(), None);
    }
}
