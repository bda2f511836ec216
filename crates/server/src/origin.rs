use http::{header, HeaderMap};
use std::net::SocketAddr;
use url::Url;

use crate::config::TrustedProxy;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_PORT: &str = "x-forwarded-port";
const FORWARDED_PREFIX: &str = "x-forwarded-prefix";

/// Where the client believes it is talking to: scheme, host and path prefix,
/// taking `X-Forwarded-*` headers into account for trusted peers only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOrigin {
	pub secure: bool,
	pub base: Url,
}

impl RequestOrigin {
	pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, proxies: &[TrustedProxy]) -> Self {
		let trusted = peer.is_some_and(|peer| proxies.iter().any(|proxy| proxy.matches(peer.ip())));
		let forwarded = |name: &str| {
			trusted
				.then(|| header_value(headers, name))
				.flatten()
		};

		let scheme = forwarded(FORWARDED_PROTO)
			.map(|proto| proto.to_ascii_lowercase())
			.filter(|proto| proto == "https" || proto == "http")
			.unwrap_or_else(|| "http".to_string());

		let mut host = forwarded(FORWARDED_HOST)
			.or_else(|| header_value(headers, header::HOST.as_str()))
			.unwrap_or_else(|| "localhost".to_string());

		if let Some(port) = forwarded(FORWARDED_PORT).filter(|port| port.parse::<u16>().is_ok()) {
			if !has_port(&host) {
				host = format!("{host}:{port}");
			}
		}

		let prefix = forwarded(FORWARDED_PREFIX).unwrap_or_default();
		let base = Url::parse(&format!("{scheme}://{host}/"))
			.and_then(|url| url.join(&format!("{}/", prefix.trim_matches('/'))))
			.unwrap_or_else(|_| Self::fallback_base());

		Self {
			secure: scheme == "https",
			base,
		}
	}

	/// Build an absolute URL for `path` (an absolute route path), appending
	/// `segment` percent-encoded when given.
	pub fn url(&self, path: &str, segment: Option<&str>) -> Url {
		let mut url = self.base.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty();
			segments.extend(path.split('/').filter(|part| !part.is_empty()));
			if let Some(segment) = segment {
				segments.push(segment);
			}
		}

		url
	}

	fn fallback_base() -> Url {
		Url::parse("http://localhost/").expect("static URL is valid")
	}
}

/// Whether `host` already names a port. IPv6 literals are bracketed, so only a
/// colon after the closing bracket counts.
fn has_port(host: &str) -> bool {
	match host.rsplit_once(']') {
		Some((_, rest)) => rest.starts_with(':'),
		None => host.contains(':'),
	}
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(',').next())
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderValue;

	fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
		let mut headers = HeaderMap::new();
		for (name, value) in pairs {
			headers.insert(*name, HeaderValue::from_static(value));
		}
		headers
	}

	fn peer(addr: &str) -> Option<SocketAddr> {
		Some(format!("{addr}:4000").parse().unwrap())
	}

	#[test]
	fn uses_host_header_without_proxies() {
		let origin = RequestOrigin::resolve(&headers(&[("host", "docs.example.com")]), peer("10.0.0.1"), &[]);

		assert!(!origin.secure);
		assert_eq!(origin.base.as_str(), "http://docs.example.com/");
	}

	#[test]
	fn ignores_forwarded_headers_from_untrusted_peer() {
		let origin = RequestOrigin::resolve(
			&headers(&[("host", "internal:8000"), ("x-forwarded-proto", "https")]),
			peer("10.0.0.2"),
			&[TrustedProxy::Addr("10.0.0.1".parse().unwrap())],
		);

		assert!(!origin.secure);
		assert_eq!(origin.base.as_str(), "http://internal:8000/");
	}

	#[test]
	fn honours_forwarded_headers_from_trusted_peer() {
		let origin = RequestOrigin::resolve(
			&headers(&[
				("host", "internal:8000"),
				("x-forwarded-proto", "https"),
				("x-forwarded-host", "docs.example.com"),
				("x-forwarded-port", "8443"),
				("x-forwarded-prefix", "/api/"),
			]),
			peer("10.0.0.1"),
			&[TrustedProxy::Addr("10.0.0.1".parse().unwrap())],
		);

		assert!(origin.secure);
		assert_eq!(origin.base.as_str(), "https://docs.example.com:8443/api/");
		assert_eq!(
			origin.url("/docs", Some("api-docs.json")).as_str(),
			"https://docs.example.com:8443/api/docs/api-docs.json"
		);
	}

	#[test]
	fn forwarded_port_applies_to_ipv6_hosts() {
		let proxies = [TrustedProxy::Any];

		let origin = RequestOrigin::resolve(
			&headers(&[("host", "[::1]"), ("x-forwarded-port", "8443")]),
			peer("10.0.0.1"),
			&proxies,
		);
		assert_eq!(origin.base.as_str(), "http://[::1]:8443/");

		let origin = RequestOrigin::resolve(
			&headers(&[("host", "[::1]:9000"), ("x-forwarded-port", "8443")]),
			peer("10.0.0.1"),
			&proxies,
		);
		assert_eq!(origin.base.as_str(), "http://[::1]:9000/");
	}

	#[test]
	fn wildcard_trusts_any_peer() {
		let origin = RequestOrigin::resolve(
			&headers(&[("x-forwarded-proto", "https")]),
			peer("192.168.1.20"),
			&[TrustedProxy::Any],
		);

		assert!(origin.secure);
		assert_eq!(origin.base.as_str(), "https://localhost/");
	}

	#[test]
	fn url_encodes_segment() {
		let origin = RequestOrigin::resolve(&HeaderMap::new(), None, &[]);

		assert_eq!(
			origin.url("/docs/billing", Some("my docs.json")).as_str(),
			"http://localhost/docs/billing/my%20docs.json"
		);
		assert_eq!(origin.url("/api/oauth2-callback", None).as_str(), "http://localhost/api/oauth2-callback");
	}
}
