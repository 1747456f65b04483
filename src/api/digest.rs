//! HTTP Digest authentication (RFC 2617, MD5) as used by the envoy inverters endpoint.

use std::collections::HashMap;

/// Username the envoy expects for installer-level endpoints.
pub const USERNAME: &str = "envoy";
/// Number of trailing serial number characters forming the password.
pub const PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Derive envoy credentials from its serial number. Serial numbers of `PASSWORD_LEN`
    /// characters or less can't authenticate and yield `None`.
    pub fn from_serial_number(serial_number: &str) -> Option<Credentials> {
        let chars: Vec<char> = serial_number.chars().collect();
        if chars.len() <= PASSWORD_LEN {
            return None;
        }

        Some(Credentials {
            username: USERNAME.to_string(),
            password: chars[chars.len() - PASSWORD_LEN..].iter().collect(),
        })
    }
}

/// Parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
    /// Set when the server offers `qop=auth`. Challenges offering only `auth-int` are rejected.
    pub qop_auth: bool,
}

/// Split `key=value, key="quoted, value"` into a map with lowercase keys.
fn parse_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut rest = input.trim();

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim().to_ascii_lowercase();
        rest = rest[eq + 1..].trim_start();

        let value = match rest.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted.find('"').unwrap_or_else(|| quoted.len());
                let value = &quoted[..end];
                rest = quoted.get(end + 1..).unwrap_or("");
                value
            }
            None => {
                let end = rest.find(',').unwrap_or_else(|| rest.len());
                let value = rest[..end].trim();
                rest = &rest[end..];
                value
            }
        };

        params.insert(key, value.to_string());
        rest = rest.trim_start().trim_start_matches(',').trim_start();
    }

    params
}

impl Challenge {
    /// Parse the value of a `WWW-Authenticate` header. Returns `None` for non-digest schemes,
    /// challenges without realm/nonce, algorithms other than MD5 and qop without `auth`.
    pub fn parse(header: &str) -> Option<Challenge> {
        let header = header.trim();
        let (scheme, params) = header.split_at(header.find(' ')?);
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let mut params = parse_params(params);
        let algorithm = params.remove("algorithm");
        if let Some(algorithm) = &algorithm {
            if !algorithm.eq_ignore_ascii_case("md5") {
                log::warn!("Unsupported digest algorithm: {}", algorithm);
                return None;
            }
        }

        let qop_auth = match params.get("qop") {
            Some(qop) if qop.split(',').any(|q| q.trim() == "auth") => true,
            Some(qop) => {
                log::warn!("Unsupported digest qop: {}", qop);
                return None;
            }
            None => false,
        };

        Some(Challenge {
            realm: params.remove("realm")?,
            nonce: params.remove("nonce")?,
            opaque: params.remove("opaque"),
            algorithm,
            qop_auth,
        })
    }

    /// Compute the `response` hash.
    pub fn response(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        nc: &str,
        cnonce: &str,
    ) -> String {
        let ha1 = md5_hex(&format!(
            "{}:{}:{}",
            credentials.username, self.realm, credentials.password
        ));
        let ha2 = md5_hex(&format!("{}:{}", method, uri));

        if self.qop_auth {
            md5_hex(&format!(
                "{}:{}:{}:{}:auth:{}",
                ha1, self.nonce, nc, cnonce, ha2
            ))
        } else {
            md5_hex(&format!("{}:{}:{}", ha1, self.nonce, ha2))
        }
    }

    /// Build the `Authorization` header value answering this challenge.
    pub fn authorization(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let nc = "00000001";
        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            credentials.username,
            self.realm,
            self.nonce,
            uri,
            self.response(credentials, method, uri, nc, cnonce)
        );

        if let Some(algorithm) = &self.algorithm {
            header.push_str(&format!(", algorithm={}", algorithm));
        }
        if self.qop_auth {
            header.push_str(&format!(", qop=auth, nc={}, cnonce=\"{}\"", nc, cnonce));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{}\"", opaque));
        }

        header
    }
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

/// Client nonce derived from the server nonce and the current time.
pub fn cnonce(nonce: &str) -> String {
    let mut cnonce = md5_hex(&format!(
        "{}:{}",
        nonce,
        chrono::Utc::now().timestamp_millis()
    ));
    cnonce.truncate(16);
    cnonce
}
