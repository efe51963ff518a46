//! backlogstat - print kernel TCP backlog counters for a socket.
//!
//! Queries a descriptor once via `getsockopt(TCP_INFO)` and prints the
//! backlog counters. The descriptor comes either from the environment
//! (`--fd`, socket-activation style) or from a listener bound on the spot
//! (`--probe`).

#[cfg(not(target_os = "linux"))]
compile_error!("backlogstat requires TCP_INFO, which is Linux-only");

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::os::fd::{AsRawFd, FromRawFd, RawFd};

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "backlogstat",
    version,
    about = "Snapshot kernel TCP backlog counters for a socket"
)]
struct Cli {
    /// Query an inherited file descriptor (e.g. from socket activation).
    #[arg(long, conflicts_with = "probe")]
    fd: Option<RawFd>,

    /// Bind a listening socket on this address and snapshot it.
    #[arg(long, value_name = "ADDR:PORT")]
    probe: Option<String>,

    /// Backlog to request when binding with --probe.
    #[arg(long, default_value_t = 128, requires = "probe")]
    backlog: i32,

    /// Output in JSON format.
    #[arg(short = 'j', long)]
    json: bool,

    /// Swallow query failures: print nothing and exit 0.
    #[arg(long)]
    tolerant: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    // --probe's listener must stay open until the snapshot is taken.
    let mut probe_listener = None;
    let fd = if let Some(fd) = cli.fd {
        fd
    } else if let Some(addr) = cli.probe.as_deref() {
        let listener = bind_probe(addr, cli.backlog)?;
        let fd = listener.as_raw_fd();
        probe_listener = Some(listener);
        fd
    } else {
        anyhow::bail!("one of --fd or --probe is required");
    };

    let snapshot = if cli.tolerant {
        match tcpq::query(fd) {
            Ok(snapshot) => snapshot,
            Err(_) => return Ok(()),
        }
    } else {
        tcpq::query(fd).with_context(|| format!("querying TCP_INFO on fd {fd}"))?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "backlog {} of {}",
            snapshot.backlog_size, snapshot.backlog_max_size
        );
    }

    drop(probe_listener);
    Ok(())
}

/// Bind a TCP listening socket with an explicit backlog.
///
/// `std::net::TcpListener::bind` always requests a backlog of 128, so the
/// socket is created by hand.
fn bind_probe(addr: &str, backlog: i32) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid probe address: {addr}"))?;

    let domain = match addr {
        SocketAddr::V4(_) => libc::AF_INET,
        SocketAddr::V6(_) => libc::AF_INET6,
    };

    // SAFETY: plain socket creation; the descriptor is checked before use.
    let fd = unsafe { libc::socket(domain, libc::SOCK_STREAM | libc::SOCK_CLOEXEC, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error()).context("creating probe socket");
    }

    // SAFETY: fd is a socket we just created and the sockaddr storage
    // matches the address family.
    let rc = unsafe {
        match addr {
            SocketAddr::V4(v4) => {
                let sin = libc::sockaddr_in {
                    sin_family: libc::AF_INET as libc::sa_family_t,
                    sin_port: v4.port().to_be(),
                    sin_addr: libc::in_addr {
                        s_addr: u32::from_ne_bytes(v4.ip().octets()),
                    },
                    sin_zero: [0; 8],
                };
                libc::bind(
                    fd,
                    (&sin as *const libc::sockaddr_in).cast(),
                    size_of::<libc::sockaddr_in>() as libc::socklen_t,
                )
            }
            SocketAddr::V6(v6) => {
                let sin6 = libc::sockaddr_in6 {
                    sin6_family: libc::AF_INET6 as libc::sa_family_t,
                    sin6_port: v6.port().to_be(),
                    sin6_flowinfo: v6.flowinfo(),
                    sin6_addr: libc::in6_addr {
                        s6_addr: v6.ip().octets(),
                    },
                    sin6_scope_id: v6.scope_id(),
                };
                libc::bind(
                    fd,
                    (&sin6 as *const libc::sockaddr_in6).cast(),
                    size_of::<libc::sockaddr_in6>() as libc::socklen_t,
                )
            }
        }
    };
    if rc != 0 {
        let err = io::Error::last_os_error();
        // SAFETY: fd is ours and not yet wrapped in an owning type.
        unsafe { libc::close(fd) };
        return Err(err).with_context(|| format!("binding {addr}"));
    }

    // SAFETY: fd is a bound socket.
    let rc = unsafe { libc::listen(fd, backlog) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        // SAFETY: as above.
        unsafe { libc::close(fd) };
        return Err(err).with_context(|| format!("listening on {addr}"));
    }

    // SAFETY: fd is an open listening socket that nothing else owns.
    Ok(unsafe { TcpListener::from_raw_fd(fd) })
}
