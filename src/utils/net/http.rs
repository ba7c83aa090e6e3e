//! Pooled HTTP clients for probes and backend calls
//!
//! Redirect policy and certificate validation are fixed when a `reqwest`
//! client is built, so probes with different settings need different
//! clients. Clients are cached per setting combination and shared by every
//! check that uses it; timeouts are applied per request.

use dashmap::DashMap;
use reqwest::{Client, ClientBuilder, redirect};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Connection settings shared by all cached clients
#[derive(Debug, Clone)]
pub struct HttpClientPoolConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// TCP keepalive interval
    pub tcp_keepalive: Duration,
    /// User agent string
    pub user_agent: &'static str,
}

impl Default for HttpClientPoolConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 16,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            tcp_keepalive: Duration::from_secs(60),
            user_agent: concat!("vigil-agent/", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Client behaviour that must be fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientOptions {
    pub follow_redirects: bool,
    pub skip_cert_validation: bool,
}

impl ClientOptions {
    pub fn new(follow_redirects: bool, skip_cert_validation: bool) -> Self {
        Self {
            follow_redirects,
            skip_cert_validation,
        }
    }
}

/// Cache of clients keyed by [`ClientOptions`]
#[derive(Debug, Default)]
pub struct HttpClientCache {
    config: HttpClientPoolConfig,
    clients: DashMap<ClientOptions, Arc<Client>>,
}

impl HttpClientCache {
    pub fn new(config: HttpClientPoolConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
        }
    }

    /// Get or build the client for `options`
    pub fn client(&self, options: ClientOptions) -> Result<Arc<Client>, reqwest::Error> {
        if let Some(client) = self.clients.get(&options) {
            return Ok(client.clone());
        }

        let client = Arc::new(build_client(&self.config, options)?);
        debug!(?options, "Created HTTP client");
        Ok(self
            .clients
            .entry(options)
            .or_insert(client)
            .clone())
    }

    /// Number of distinct clients built so far
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Build a client with the pool settings and the given options
pub fn build_client(
    config: &HttpClientPoolConfig,
    options: ClientOptions,
) -> Result<Client, reqwest::Error> {
    let redirects = if options.follow_redirects {
        redirect::Policy::default()
    } else {
        redirect::Policy::none()
    };

    ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(config.tcp_keepalive)
        .tcp_nodelay(true)
        .user_agent(config.user_agent)
        .redirect(redirects)
        .danger_accept_invalid_certs(options.skip_cert_validation)
        .build()
}
