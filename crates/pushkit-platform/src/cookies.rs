//! Cookie access
//!
//! Reads values out of a `document.cookie` string.

use std::sync::{Mutex, PoisonError};

/// Look up `name` in a `document.cookie` string
///
/// Values are percent-decoded; a value that does not decode to UTF-8 is
/// returned as stored.
pub fn get_cookie(document_cookie: &str, name: &str) -> Option<String> {
    if document_cookie.is_empty() {
        return None;
    }

    let prefix = format!("{}=", name);
    document_cookie
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|raw| match urlencoding::decode(raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw.to_string(),
        })
}

/// Source of the page's `document.cookie`
pub trait CookieSource {
    fn document_cookie(&self) -> String;

    fn get_cookie(&self, name: &str) -> Option<String> {
        get_cookie(&self.document_cookie(), name)
    }
}

/// In-memory cookie jar for a single page
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<Vec<(String, String)>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar holding one cookie
    pub fn with_cookie(name: &str, value: &str) -> Self {
        let jar = Self::new();
        jar.set(name, value);
        jar
    }

    /// Set or replace a cookie; the value is stored percent-encoded
    pub fn set(&self, name: &str, value: &str) {
        let encoded = urlencoding::encode(value).into_owned();
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        match cookies.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = encoded,
            None => cookies.push((name.to_string(), encoded)),
        }
    }

    pub fn remove(&self, name: &str) -> bool {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let before = cookies.len();
        cookies.retain(|(n, _)| n != name);
        cookies.len() != before
    }
}

impl CookieSource for CookieJar {
    fn document_cookie(&self) -> String {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
