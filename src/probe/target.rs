use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use url::Url;

use crate::error::ProbeError;

/// Schemes tried against every origin, in order.
pub const SCHEMES: [(&str, u16); 2] = [("https", 443), ("http", 80)];

/// An origin address as written in the site record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginAddr {
    Socket(SocketAddr),
    Ip(IpAddr),
    Host { host: String, port: Option<u16> },
}

impl OriginAddr {
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        let raw = raw.trim();
        if let Ok(sa) = raw.parse::<SocketAddr>() {
            return Ok(OriginAddr::Socket(sa));
        }
        if let Ok(ip) = raw.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(OriginAddr::Ip(ip));
        }

        let (host, port) = match raw.rsplit_once(':') {
            Some((h, p)) => {
                let port = p.parse::<u16>().map_err(|_| ProbeError::InvalidTarget(raw.to_string()))?;
                (h, Some(port))
            }
            None => (raw, None),
        };
        let valid = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_');
        if !valid {
            return Err(ProbeError::InvalidTarget(raw.to_string()));
        }
        Ok(OriginAddr::Host { host: host.to_ascii_lowercase(), port })
    }

    fn explicit_port(&self) -> Option<u16> {
        match self {
            OriginAddr::Socket(sa) => Some(sa.port()),
            OriginAddr::Ip(_) => None,
            OriginAddr::Host { port, .. } => *port,
        }
    }
}

/// One concrete request to send for an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub url: Url,
    /// Host name pinned to an address, bypassing DNS for that name.
    pub pin: Option<(String, SocketAddr)>,
}

/// Builds the request list for `origin`, one target per scheme.
///
/// With a site domain the URL carries the domain and the connection is
/// pinned to the origin address. Host-name origins are resolved first, within
/// `timeout`. Without a domain the origin itself is the URL host.
pub async fn plan_targets(domain: Option<&str>, origin: &str, timeout: Duration) -> Result<Vec<ProbeTarget>, ProbeError> {
    let addr = OriginAddr::parse(origin)?;

    let Some(domain) = domain else {
        return SCHEMES
            .iter()
            .map(|(scheme, default_port)| {
                let port = addr.explicit_port().unwrap_or(*default_port);
                let authority = match &addr {
                    OriginAddr::Socket(sa) => SocketAddr::new(sa.ip(), port).to_string(),
                    OriginAddr::Ip(ip) => SocketAddr::new(*ip, port).to_string(),
                    OriginAddr::Host { host, .. } => format!("{}:{}", host, port),
                };
                build_url(scheme, &authority).map(|url| ProbeTarget { url, pin: None })
            })
            .collect();
    };

    let ip = match &addr {
        OriginAddr::Socket(sa) => sa.ip(),
        OriginAddr::Ip(ip) => *ip,
        OriginAddr::Host { host, .. } => resolve_host(host, timeout).await?,
    };

    let mut targets = Vec::with_capacity(SCHEMES.len());
    for (scheme, default_port) in SCHEMES {
        let port = addr.explicit_port().unwrap_or(default_port);
        let url = build_url(scheme, &format!("{}:{}", domain, port))?;
        let host = url
            .host_str()
            .ok_or_else(|| ProbeError::InvalidTarget(domain.to_string()))?
            .to_string();
        targets.push(ProbeTarget { url, pin: Some((host, SocketAddr::new(ip, port))) });
    }
    Ok(targets)
}

fn build_url(scheme: &str, authority: &str) -> Result<Url, ProbeError> {
    let raw = format!("{}://{}/", scheme, authority);
    Url::parse(&raw).map_err(|_| ProbeError::InvalidTarget(authority.to_string()))
}

async fn resolve_host(host: &str, timeout: Duration) -> Result<IpAddr, ProbeError> {
    let dns_err = |reason: String| ProbeError::Dns { host: host.to_string(), reason };
    let lookup = tokio::time::timeout(timeout, tokio::net::lookup_host((host, 0)))
        .await
        .map_err(|_| dns_err(format!("timed out after {}s", timeout.as_secs())))?;
    let mut addrs = lookup.map_err(|e| dns_err(e.to_string()))?;
    addrs
        .next()
        .map(|sa| sa.ip())
        .ok_or_else(|| dns_err("no addresses returned".to_string()))
}
