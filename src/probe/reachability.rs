use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::concurrent::ConcurrentProbe;
use crate::config::Options;
use crate::error::{error_chain, ProbeError};
use crate::http_client::create_probe_client;
use crate::probe::target::{plan_targets, ProbeTarget};
use crate::sites::Site;
use crate::waf;

/// Outcome of the direct origin check for one site.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub site: Site,
    pub reachable: bool,
    /// Origin address that answered.
    pub origin: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub response_ms: Option<u64>,
    /// WAF edge signature seen in the direct answer.
    pub waf: Option<String>,
    pub error: Option<String>,
}

impl CheckResult {
    pub fn failed(site: Site, error: impl Into<String>) -> Self {
        Self {
            site,
            reachable: false,
            origin: None,
            url: None,
            status: None,
            response_ms: None,
            waf: None,
            error: Some(error.into()),
        }
    }

    /// The origin answered without any WAF in front of it.
    pub fn exposed(&self) -> bool {
        self.reachable && self.waf.is_none()
    }
}

/// What came back from a target that answered.
#[derive(Debug, Clone)]
struct Hit {
    url: String,
    status: u16,
    response_ms: u64,
    waf: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct ReachabilityChecker {
    timeout: Duration,
    concurrency: usize,
}

impl ReachabilityChecker {
    pub fn new(timeout: Duration, concurrency: usize) -> Self {
        Self { timeout, concurrency: concurrency.max(1) }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(options.timeout(), options.concurrency)
    }

    /// Checks every site. Always returns one result per site, in input order.
    pub async fn check_all(&self, sites: &[Site]) -> Vec<CheckResult> {
        let executor = ConcurrentProbe::new(self.concurrency);
        let checker = Arc::new(self.clone());

        let outputs = executor
            .execute(sites.to_vec(), move |site| {
                let checker = checker.clone();
                async move { checker.check_site(&site).await }
            })
            .await;

        let (completed, errors) = executor.get_stats();
        tracing::debug!(completed, errors, "origin checks finished");

        outputs
            .into_iter()
            .zip(sites)
            .map(|(out, site)| out.unwrap_or_else(|| CheckResult::failed(site.clone(), "probe task aborted")))
            .collect()
    }

    /// Tries each origin of `site` until one answers.
    pub async fn check_site(&self, site: &Site) -> CheckResult {
        let origins = site.origins();
        if origins.is_empty() {
            tracing::info!(site=%site.label(), "no origin address to check");
            return CheckResult::failed(site.clone(), ProbeError::NoOrigin.to_string());
        }

        let mut failures = Vec::new();
        for origin in &origins {
            let targets = match plan_targets(site.domain(), origin, self.timeout).await {
                Ok(t) => t,
                Err(e) => {
                    failures.push(format!("{}: {}", origin, e));
                    continue;
                }
            };

            for target in &targets {
                match self.probe_target(target).await {
                    Ok(hit) => {
                        if hit.waf.is_none() {
                            tracing::warn!(site=%site.label(), origin=%origin, url=%hit.url, status = hit.status, "origin answers directly");
                        } else {
                            tracing::info!(site=%site.label(), origin=%origin, waf = ?hit.waf, "origin address is a WAF edge");
                        }
                        return CheckResult {
                            site: site.clone(),
                            reachable: true,
                            origin: Some(origin.clone()),
                            url: Some(hit.url),
                            status: Some(hit.status),
                            response_ms: Some(hit.response_ms),
                            waf: hit.waf.map(str::to_string),
                            error: None,
                        };
                    }
                    Err(e) => {
                        tracing::debug!(site=%site.label(), url=%target.url, error=%e, "probe attempt failed");
                        failures.push(format!("{} via {}: {}", target.url, origin, e));
                    }
                }
            }
        }

        tracing::info!(site=%site.label(), "origin not reachable directly");
        CheckResult::failed(site.clone(), failures.join("; "))
    }

    async fn probe_target(&self, target: &ProbeTarget) -> Result<Hit, ProbeError> {
        let pin = target.pin.as_ref().map(|(host, addr)| (host.as_str(), *addr));
        let client = create_probe_client(self.timeout, pin).map_err(|e| ProbeError::Client(error_chain(&e)))?;

        let start = Instant::now();
        let response = tokio::time::timeout(self.timeout, client.get(target.url.clone()).send())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| classify(e, self.timeout))?;

        Ok(Hit {
            url: target.url.to_string(),
            status: response.status().as_u16(),
            response_ms: start.elapsed().as_millis() as u64,
            waf: waf::detect(response.headers()),
        })
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout(timeout.as_secs())
    } else if err.is_connect() {
        ProbeError::Connect(error_chain(&err))
    } else {
        ProbeError::Request(error_chain(&err))
    }
}
