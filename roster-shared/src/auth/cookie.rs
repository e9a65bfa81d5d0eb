/// Session cookie handling
///
/// The session token travels in an httpOnly cookie rather than an
/// `Authorization` header, so the browser client never touches it.
///
/// Development builds use `SameSite=Lax` over plain HTTP. Production sets
/// `SameSite=None; Secure` because the client is served from another origin.
///
/// # Example
///
/// ```
/// use roster_shared::auth::cookie::{SameSite, SessionCookie};
///
/// let cookie = SessionCookie::new(false);
/// let header = cookie.issue("abc.def.ghi").unwrap();
/// assert!(header.to_str().unwrap().starts_with("token=abc.def.ghi;"));
/// assert_eq!(cookie.same_site, SameSite::Lax);
/// ```

use axum::http::{header, header::InvalidHeaderValue, HeaderMap, HeaderValue};

use super::jwt::session_lifetime;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "token";

/// `SameSite` attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Attributes of the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,

    /// Whether to set the `Secure` attribute
    pub secure: bool,

    /// `SameSite` attribute
    pub same_site: SameSite,

    /// `Max-Age` in seconds
    pub max_age_seconds: i64,
}

impl SessionCookie {
    /// Builds the cookie attributes for the given environment
    pub fn new(production: bool) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            secure: production,
            same_site: if production { SameSite::None } else { SameSite::Lax },
            max_age_seconds: session_lifetime().num_seconds(),
        }
    }

    /// `Set-Cookie` value carrying a freshly issued token
    pub fn issue(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.render(token, self.max_age_seconds))
    }

    /// `Set-Cookie` value that makes the browser drop the session
    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.render("", 0))
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; Max-Age={}; SameSite={}",
            self.name,
            value,
            max_age,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Reads a cookie value from the request headers
///
/// All `Cookie` headers are scanned; the first pair with a matching name
/// wins. Empty values count as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
        .find(|value| !value.is_empty())
}
