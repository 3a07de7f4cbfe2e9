use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser, Debug)]
pub struct Args {
    /// Whether miniblog's clients connect to it over https.
    /// If so, the sessionid cookie is sent as a secure cookie.
    #[arg(short, long)]
    secure: bool,

    /// The address miniblog should listen on. By default
    /// miniblog will listen just on the IPv4 loopback.
    #[arg(short, long)]
    address: Option<String>,

    /// The port miniblog listens on.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// The host the redis store lives on.
    #[arg(long, default_value = "127.0.0.1")]
    redis_host: String,

    /// The port the redis store listens on.
    #[arg(long, default_value_t = 6379)]
    redis_port: u16,

    /// Directory served under /static.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

impl Args {
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.address
            .as_deref()
            .unwrap_or("127.0.0.1")
            .parse()
            .map(|addr: IpAddr| (addr, self.port).into())
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn redis_host(&self) -> &str {
        &self.redis_host
    }

    pub fn redis_port(&self) -> u16 {
        self.redis_port
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }
}
