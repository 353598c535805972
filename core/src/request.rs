// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use http::header::HeaderName;
use http::HeaderValue;
use http::Method;
use http::Uri;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;

use crate::utils::Redact;
use crate::Result;

/// Header names whose values must never show up in debug output.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "x-amz-security-token"];

/// HeaderList is an ordered collection of headers.
///
/// Names keep the casing they were inserted with, and lookups ignore ASCII
/// case. Iteration follows insertion order; anything that needs a canonical
/// order (like request signing) has to sort by itself.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Insert a header.
    ///
    /// If a header with the same name (ignoring case) exists, its value is
    /// replaced in place, the original name casing and position are kept, and
    /// the old value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Get header value by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Check if a header exists, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header by name, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for HeaderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for (k, v) in self.iter() {
            if SENSITIVE_HEADERS.iter().any(|s| k.eq_ignore_ascii_case(s)) {
                m.entry(&k, &Redact::from(v));
            } else {
                m.entry(&k, &v);
            }
        }
        m.finish()
    }
}

/// Serialize as a JSON object mapping every header name to a single-element
/// array holding its value: `{"Host": ["sts.amazonaws.com"]}`.
impl Serialize for HeaderList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, &[v])?;
        }
        map.end()
    }
}

/// RequestDescriptor is a fully described HTTP request ready to be signed
/// or handed over to a transport.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Full target URL, like `https://sts.amazonaws.com/`.
    pub url: String,
    /// URL path, `/` if the URL carries none.
    pub path: String,
    /// Raw query string without the leading `?`, empty if absent.
    pub query: String,
    /// Headers in transmission casing.
    pub headers: HeaderList,
    /// Request body.
    pub body: Bytes,
}

impl RequestDescriptor {
    /// Build a descriptor for the given method, URL and body.
    ///
    /// Path and query are derived from the URL.
    pub fn new(method: Method, url: &str, body: impl Into<Bytes>) -> Result<Self> {
        let uri = Uri::from_str(url)?;

        Ok(Self {
            method,
            url: url.to_string(),
            path: match uri.path() {
                "" => "/".to_string(),
                p => p.to_string(),
            },
            query: uri.query().unwrap_or_default().to_string(),
            headers: HeaderList::new(),
            body: body.into(),
        })
    }

    /// Body as UTF-8 text.
    pub fn body_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).map_err(|e| {
            crate::Error::request_invalid("request body is not valid utf-8").with_source(e)
        })
    }

    /// Convert into an `http::Request` for transmission.
    ///
    /// Credential carrying headers are marked as sensitive.
    pub fn into_http_request(self) -> Result<http::Request<Bytes>> {
        let mut req = http::Request::builder()
            .method(self.method)
            .uri(self.url.as_str())
            .body(self.body)?;

        let headers = req.headers_mut();
        for (k, v) in self.headers.iter() {
            let name = HeaderName::from_bytes(k.as_bytes())?;
            let mut value = HeaderValue::from_str(v)?;
            if SENSITIVE_HEADERS.contains(&name.as_str()) {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_list_is_case_insensitive_and_ordered() {
        let mut h = HeaderList::new();
        assert!(h.is_empty());
        h.insert("Content-Type", "text/plain");
        h.insert("Host", "sts.amazonaws.com");

        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("HOST"), Some("sts.amazonaws.com"));
        assert!(h.contains("host"));
        assert_eq!(h.get("x-amz-date"), None);

        let old = h.insert("content-TYPE", "application/json");
        assert_eq!(old.as_deref(), Some("text/plain"));
        assert_eq!(h.len(), 2);
        assert_eq!(
            h.iter().collect::<Vec<_>>(),
            vec![
                ("Content-Type", "application/json"),
                ("Host", "sts.amazonaws.com")
            ]
        );

        assert_eq!(h.remove("CONTENT-type").as_deref(), Some("application/json"));
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![("Host", "sts.amazonaws.com")]);
    }

    #[test]
    fn test_header_list_serializes_values_as_arrays() {
        let mut h = HeaderList::new();
        h.insert("Host", "sts.amazonaws.com");
        h.insert("X-Amz-Date", "20230101T000000Z");

        let s = serde_json::to_string(&h).expect("must serialize");
        assert_eq!(
            s,
            r#"{"Host":["sts.amazonaws.com"],"X-Amz-Date":["20230101T000000Z"]}"#
        );
    }

    #[test]
    fn test_header_list_debug_redacts_secrets() {
        let mut h = HeaderList::new();
        h.insert("Host", "sts.amazonaws.com");
        h.insert("X-Amz-Security-Token", "FwoGZXIvYXdzEJr//////////wEaDE");

        let s = format!("{h:?}");
        assert!(s.contains("sts.amazonaws.com"));
        assert!(!s.contains("FwoGZXIvYXdzEJr"));
    }

    #[test]
    fn test_request_descriptor_parts() -> Result<()> {
        let req = RequestDescriptor::new(Method::POST, "https://sts.amazonaws.com/", "a=b")?;
        assert_eq!(req.path, "/");
        assert_eq!(req.query, "");
        assert_eq!(req.body_str()?, "a=b");

        let req = RequestDescriptor::new(Method::GET, "https://example.com/v1?x=1", "")?;
        assert_eq!(req.path, "/v1");
        assert_eq!(req.query, "x=1");
        Ok(())
    }

    #[test]
    fn test_into_http_request() -> Result<()> {
        let mut req = RequestDescriptor::new(Method::POST, "https://sts.amazonaws.com/", "a=b")?;
        req.headers.insert("Host", "sts.amazonaws.com");
        req.headers.insert("Authorization", "AWS4-HMAC-SHA256 secret");

        let req = req.into_http_request()?;
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri(), "https://sts.amazonaws.com/");
        assert_eq!(req.headers()["host"], "sts.amazonaws.com");
        assert!(req.headers()["authorization"].is_sensitive());
        assert_eq!(req.body().as_ref(), b"a=b");
        Ok(())
    }

    #[test]
    fn test_into_http_request_rejects_control_characters() -> Result<()> {
        let mut req = RequestDescriptor::new(Method::POST, "https://sts.amazonaws.com/", "")?;
        req.headers.insert("X-Amz-Security-Token", "line\nbreak");

        let err = req.into_http_request().expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        Ok(())
    }

    #[test]
    fn test_non_utf8_body_is_rejected() -> Result<()> {
        let req = RequestDescriptor::new(
            Method::POST,
            "https://sts.amazonaws.com/",
            vec![0xff, 0xfe],
        )?;
        assert_eq!(
            req.body_str().expect_err("must fail").kind(),
            ErrorKind::RequestInvalid
        );
        Ok(())
    }
}
