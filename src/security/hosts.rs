//! Allowed-host enforcement.
//!
//! # Rules
//! - Port is ignored, comparison is case-insensitive
//! - `all` accepts every host
//! - `.example.com` accepts example.com and any subdomain
//! - `localhost` and IP literals are always accepted
//! - A request without a host is rejected

use std::net::IpAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;

/// Host policy shared with the middleware; swapped on config reload.
pub type SharedHostPolicy = Arc<ArcSwap<HostPolicy>>;

/// Compiled host allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPolicy {
    allow_all: bool,
    exact: Vec<String>,
    suffixes: Vec<String>,
}

impl HostPolicy {
    pub fn new(hosts: &[String]) -> Self {
        let mut policy = Self::default();
        for host in hosts {
            let host = host.trim().to_ascii_lowercase();
            if host == "all" {
                policy.allow_all = true;
            } else if let Some(domain) = host.strip_prefix('.') {
                policy.suffixes.push(domain.to_string());
            } else {
                policy.exact.push(host);
            }
        }
        policy
    }

    pub fn shared(hosts: &[String]) -> SharedHostPolicy {
        Arc::new(ArcSwap::from_pointee(Self::new(hosts)))
    }

    /// Check a Host header value (with or without port).
    pub fn is_allowed(&self, host_header: &str) -> bool {
        if self.allow_all {
            return true;
        }

        let host = strip_port(host_header.trim()).to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        if host == "localhost" || host.parse::<IpAddr>().is_ok() {
            return true;
        }

        self.exact.iter().any(|h| *h == host)
            || self.suffixes.iter().any(|domain| {
                host == *domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        // [::1]:8080
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

/// Reject requests whose Host is not allowed.
pub async fn allowed_hosts_middleware(
    State(policy): State<SharedHostPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()));

    match host {
        Some(host) if policy.load().is_allowed(&host) => next.run(req).await,
        host => {
            tracing::warn!(
                request_id = %request_id(&req),
                host = ?host,
                path = %req.uri().path(),
                "Rejected request with disallowed host"
            );
            (StatusCode::FORBIDDEN, "Invalid Host header").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(hosts: &[&str]) -> HostPolicy {
        HostPolicy::new(&hosts.iter().map(|h| h.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_named_hosts() {
        let p = policy(&["careertrack.ddns.net", "localhost"]);

        assert!(p.is_allowed("careertrack.ddns.net"));
        assert!(p.is_allowed("CareerTrack.ddns.net:8080"));
        assert!(p.is_allowed("localhost:8080"));
        assert!(!p.is_allowed("evil.example"));
        assert!(!p.is_allowed("sub.careertrack.ddns.net"));
        assert!(!p.is_allowed(""));
    }

    #[test]
    fn test_ip_literals_always_allowed() {
        let p = policy(&["careertrack.ddns.net"]);

        assert!(p.is_allowed("127.0.0.1:8080"));
        assert!(p.is_allowed("10.0.0.7"));
        assert!(p.is_allowed("[::1]:8080"));
        assert!(p.is_allowed("localhost"));
    }

    #[test]
    fn test_subdomain_wildcard() {
        let p = policy(&[".ddns.net"]);

        assert!(p.is_allowed("ddns.net"));
        assert!(p.is_allowed("careertrack.ddns.net"));
        assert!(!p.is_allowed("evilddns.net"));
    }

    #[test]
    fn test_all() {
        assert!(policy(&["all"]).is_allowed("anything.example:1234"));
    }

    #[test]
    fn test_swap() {
        let shared = HostPolicy::shared(&["a.test".to_string()]);
        assert!(shared.load().is_allowed("a.test"));

        shared.store(Arc::new(policy(&["b.test"])));
        assert!(!shared.load().is_allowed("a.test"));
        assert!(shared.load().is_allowed("b.test"));
    }
}
