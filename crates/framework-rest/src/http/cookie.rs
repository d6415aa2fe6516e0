//! HTTP cookies: request rendering and `Set-Cookie` parsing.

use std::fmt;
use std::time::SystemTime;

use framework_core::logging::targets;

use crate::error::{RestError, Result};

/// A cookie sent with a request or received in a response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// `Domain` attribute.
    pub domain: Option<String>,
    /// `Path` attribute.
    pub path: Option<String>,
    /// `Expires` attribute.
    pub expires: Option<SystemTime>,
    /// `Max-Age` attribute in seconds.
    pub max_age: Option<i64>,
    /// `SameSite` attribute: `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// `Secure` flag.
    pub secure: bool,
    /// `HttpOnly` flag.
    pub http_only: bool,
}

impl Cookie {
    /// Create a cookie with just a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Builder: set the domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Builder: set the path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Check that name and value can be placed in a `Cookie` header.
    pub fn validate(&self) -> Result<()> {
        let bad_name = self.name.is_empty()
            || self
                .name
                .chars()
                .any(|c| c.is_ascii_control() || c.is_whitespace() || "()<>@,;:\\\"/[]?={}".contains(c));
        if bad_name {
            return Err(RestError::InvalidHeader(format!("invalid cookie name '{}'", self.name)));
        }
        if self
            .value
            .chars()
            .any(|c| c.is_ascii_control() || c == ';' || c == ',' || !c.is_ascii())
        {
            return Err(RestError::InvalidHeader(format!(
                "invalid value for cookie '{}'",
                self.name
            )));
        }
        Ok(())
    }

    /// Parse a `Set-Cookie` header value. Returns `None` if the header is
    /// not a valid cookie.
    ///
    /// ```
    /// use framework_rest::http::Cookie;
    ///
    /// let cookie = Cookie::parse_set_cookie("sid=abc; Path=/; HttpOnly").unwrap();
    /// assert_eq!(cookie.name, "sid");
    /// assert_eq!(cookie.path.as_deref(), Some("/"));
    /// assert!(cookie.http_only);
    /// ```
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let parsed = ::cookie::Cookie::parse(header).ok()?;
        Some(Self::from(&parsed))
    }
}

impl From<&::cookie::Cookie<'_>> for Cookie {
    fn from(parsed: &::cookie::Cookie<'_>) -> Self {
        Self {
            name: parsed.name().to_string(),
            value: parsed.value().trim_matches('"').to_string(),
            domain: parsed.domain().map(|d| d.trim_start_matches('.').to_string()),
            path: parsed.path().map(str::to_string),
            expires: parsed.expires_datetime().map(SystemTime::from),
            max_age: parsed.max_age().map(|age| age.whole_seconds()),
            same_site: parsed.same_site().map(|s| s.to_string()),
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Render cookies as a single `Cookie` request header value.
pub(crate) fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(Cookie::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collect every parseable `Set-Cookie` header of a response.
pub(crate) fn from_headers(headers: &http::HeaderMap) -> Vec<Cookie> {
    let mut cookies = Vec::new();
    for value in headers.get_all(http::header::SET_COOKIE) {
        let Ok(text) = value.to_str() else {
            tracing::warn!(
                target: targets::REST_COOKIE,
                header_value = ?value,
                "non-text Set-Cookie header"
            );
            continue;
        };
        match ::cookie::Cookie::parse(text) {
            Ok(parsed) => cookies.push(Cookie::from(&parsed)),
            Err(err) => {
                tracing::warn!(
                    target: targets::REST_COOKIE,
                    header_value = %text,
                    error = %err,
                    "failed to parse Set-Cookie header"
                );
            }
        }
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_set_cookie() {
        let cookie = Cookie::parse_set_cookie(
            "token=\"xyz\"; Domain=.example.com; Path=/api; Max-Age=3600; Secure; HttpOnly",
        )
        .unwrap();

        assert_eq!(cookie.name, "token");
        assert_eq!(cookie.value, "xyz");
        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(cookie.path.as_deref(), Some("/api"));
        assert_eq!(cookie.max_age, Some(3600));
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_parse_expires_and_same_site() {
        let cookie = Cookie::parse_set_cookie(
            "lang=en; Expires=Wed, 21 Oct 2015 07:28:00 GMT; SameSite=Lax",
        )
        .unwrap();

        let expires = cookie.expires.unwrap();
        let secs = expires.duration_since(std::time::UNIX_EPOCH).unwrap().as_secs();
        assert_eq!(secs, 1_445_412_480);
        assert_eq!(cookie.same_site.as_deref(), Some("Lax"));
        assert!(!cookie.secure);
    }

    #[test]
    fn test_parse_rejects_missing_pair() {
        assert!(Cookie::parse_set_cookie("").is_none());
        assert!(Cookie::parse_set_cookie("novalue").is_none());
        assert!(Cookie::parse_set_cookie("=value").is_none());
    }

    #[test]
    fn test_cookie_header_rendering() {
        let cookies = vec![Cookie::new("a", "1"), Cookie::new("b", "two")];
        assert_eq!(cookie_header(&cookies), "a=1; b=two");
    }

    #[test]
    fn test_validate() {
        assert!(Cookie::new("ok", "value").validate().is_ok());
        assert!(Cookie::new("", "value").validate().is_err());
        assert!(Cookie::new("bad name", "v").validate().is_err());
        assert!(Cookie::new("n", "a;b").validate().is_err());
    }

    #[test]
    fn test_from_headers() {
        let mut headers = http::HeaderMap::new();
        headers.append(http::header::SET_COOKIE, "a=1; Path=/".parse().unwrap());
        headers.append(http::header::SET_COOKIE, "b=2".parse().unwrap());
        headers.append(http::header::SET_COOKIE, "garbage".parse().unwrap());

        let names: Vec<_> = from_headers(&headers).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
