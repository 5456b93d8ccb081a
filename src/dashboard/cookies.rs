use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};
use std::collections::HashMap;

use crate::session::ClientStorage;

/// The browser's cookie jar seen through [`ClientStorage`].
///
/// Reads come from the request's `Cookie` headers. Writes are kept as
/// pending cookies and emitted as `Set-Cookie` by [`CookieStorage::apply`].
#[derive(Debug, Clone, Default)]
pub struct CookieStorage {
    values: HashMap<String, String>,
    pending: Vec<Cookie<'static>>,
    secure: bool,
}

impl CookieStorage {
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let mut values = HashMap::new();
        for header_value in headers.get_all(header::COOKIE) {
            let Ok(raw) = header_value.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse_encoded(raw).flatten() {
                values.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        Self {
            values,
            pending: Vec::new(),
            secure,
        }
    }

    fn base(&self, key: &str, value: &str) -> cookie::CookieBuilder<'static> {
        Cookie::build((key.to_string(), value.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
    }

    /// Cookies written since this storage was read.
    pub fn pending(&self) -> &[Cookie<'static>] {
        &self.pending
    }

    /// Append one `Set-Cookie` per pending write.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for cookie in &self.pending {
            match HeaderValue::from_str(&cookie.encoded().to_string()) {
                Ok(value) => {
                    headers.append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(cookie = cookie.name(), error = %e, "dropping unencodable cookie"),
            }
        }
    }
}

impl ClientStorage for CookieStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.pending.push(self.base(key, value).permanent().build());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.pending.push(
            self.base(key, "")
                .max_age(cookie::time::Duration::ZERO)
                .build(),
        );
    }
}
