use reqwest::{Client, ClientBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Timeout for the provider API call. Independent of the probe timeout.
pub const API_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("waf_origin_check/", env!("CARGO_PKG_VERSION"));

/// Client for the provider management API.
pub fn create_api_client() -> reqwest::Result<Client> {
    ClientBuilder::new()
        .timeout(API_TIMEOUT)
        .connect_timeout(Duration::from_secs(5))
        .gzip(true)
        .brotli(true)
        .use_rustls_tls()
        .user_agent(USER_AGENT)
        .build()
}

/// Client for one direct origin probe.
///
/// With `pin`, requests for that host name connect to the given address
/// instead of resolving it, which keeps SNI and `Host` on the real site name.
pub fn create_probe_client(timeout: Duration, pin: Option<(&str, SocketAddr)>) -> reqwest::Result<Client> {
    let mut builder = ClientBuilder::new()
        // Never route through a proxy: the point is to hit the origin itself
        .no_proxy()
        .timeout(timeout)
        .connect_timeout(timeout)
        .tcp_nodelay(true)
        .pool_max_idle_per_host(0)
        .use_rustls_tls()
        .tls_sni(true)
        .https_only(false)
        // First answer is what we want to classify
        .redirect(reqwest::redirect::Policy::none())
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        // Origins rarely present a certificate valid for the address we dial
        .danger_accept_invalid_certs(true);

    if let Some((host, addr)) = pin {
        builder = builder.resolve(host, addr);
    }

    builder.build()
}
