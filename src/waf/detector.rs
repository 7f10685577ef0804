use reqwest::header::HeaderMap;

/// Header and cookie markers a WAF edge adds to every response it serves.
pub struct WafSignature {
    pub name: &'static str,
    /// (header name, substring of value; empty matches any value)
    pub headers: &'static [(&'static str, &'static str)],
    pub server_patterns: &'static [&'static str],
    pub cookies: &'static [&'static str],
}

pub const SIGNATURES: &[WafSignature] = &[
    WafSignature {
        name: "Imperva Incapsula",
        headers: &[("x-iinfo", ""), ("x-cdn", "incapsula"), ("x-cdn", "imperva")],
        server_patterns: &["incapsula", "imperva"],
        cookies: &["incap_ses_", "visid_incap_", "nlbi_"],
    },
    WafSignature {
        name: "Cloudflare",
        headers: &[("cf-ray", ""), ("cf-cache-status", "")],
        server_patterns: &["cloudflare"],
        cookies: &["__cf_bm", "__cfduid"],
    },
    WafSignature {
        name: "Akamai",
        headers: &[("akamai-grn", ""), ("x-akamai-transformed", "")],
        server_patterns: &["akamaighost"],
        cookies: &["ak_bmsc"],
    },
    WafSignature {
        name: "Sucuri CloudProxy",
        headers: &[("x-sucuri-id", ""), ("x-sucuri-cache", "")],
        server_patterns: &["sucuri"],
        cookies: &[],
    },
];

/// Returns the first WAF whose signature shows up in `headers`.
///
/// An "origin" address that answers with these markers is really a WAF edge,
/// so the site stays protected even though the address responded.
pub fn detect(headers: &HeaderMap) -> Option<&'static str> {
    SIGNATURES.iter().find(|sig| signature_matches(sig, headers)).map(|sig| sig.name)
}

fn signature_matches(sig: &WafSignature, headers: &HeaderMap) -> bool {
    for (name, pattern) in sig.headers {
        for value in headers.get_all(*name) {
            let Ok(v) = value.to_str() else { continue };
            if pattern.is_empty() || v.to_lowercase().contains(pattern) {
                return true;
            }
        }
    }

    if let Some(server) = headers.get(reqwest::header::SERVER).and_then(|v| v.to_str().ok()) {
        let server = server.to_lowercase();
        if sig.server_patterns.iter().any(|p| server.contains(p)) {
            return true;
        }
    }

    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|cookie| sig.cookies.iter().any(|c| cookie.contains(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn imperva_by_iinfo() {
        let h = headers(&[("x-iinfo", "9-1234-0 0NNN RT(1 2) q(0 0 0 -1) r(0 0)")]);
        assert_eq!(detect(&h), Some("Imperva Incapsula"));
    }

    #[test]
    fn imperva_by_cookie_among_several() {
        let h = headers(&[("set-cookie", "session=1; Path=/"), ("set-cookie", "visid_incap_123=abc; path=/")]);
        assert_eq!(detect(&h), Some("Imperva Incapsula"));
    }

    #[test]
    fn cloudflare_by_server() {
        assert_eq!(detect(&headers(&[("server", "cloudflare")])), Some("Cloudflare"));
    }

    #[test]
    fn plain_origin_has_no_signature() {
        let h = headers(&[("server", "nginx/1.25.3"), ("content-type", "text/html")]);
        assert_eq!(detect(&h), None);
    }
}
