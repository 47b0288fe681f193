use std::collections::HashMap;
use std::fmt;

/// Request header names the server recognises.
///
/// Each variant is one slot in a [`HeaderMap`]. Anything else lands in the
/// map's list of extra headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Header {
    Accept,
    AcceptCharset,
    AcceptEncoding,
    AcceptLanguage,
    AcceptDatetime,
    AccessControlRequestMethod,
    AccessControlRequestHeaders,
    Authorization,
    CacheControl,
    Connection,
    Cookie,
    ContentLength,
    ContentMd5,
    ContentType,
    Date,
    Expect,
    Forwarded,
    From,
    Host,
    IfMatch,
    IfModifiedSince,
    IfNoneMatch,
    IfRange,
    IfUnmodifiedSince,
    MaxForwards,
    Pragma,
    ProxyAuthorization,
    Range,
    Referer,
    Te,
    UserAgent,
    Upgrade,
    XRequestedWith,
    Dnt,
    XForwardedFor,
    XForwardedHost,
    XForwardedProto,
    FrontEndHttps,
    XHttpMethodOverride,
    XAttDeviceId,
    XWapProfile,
    ProxyConnection,
    XUidh,
    XCsrfToken,
    XRequestId,
    XCorrelationId,
}

/// The header table, in canonical spelling.
const TABLE: &[(Header, &str)] = &[
    (Header::Accept, "Accept"),
    (Header::AcceptCharset, "Accept-Charset"),
    (Header::AcceptEncoding, "Accept-Encoding"),
    (Header::AcceptLanguage, "Accept-Language"),
    (Header::AcceptDatetime, "Accept-Datetime"),
    (Header::AccessControlRequestMethod, "Access-Control-Request-Method"),
    (Header::AccessControlRequestHeaders, "Access-Control-Request-Headers"),
    (Header::Authorization, "Authorization"),
    (Header::CacheControl, "Cache-Control"),
    (Header::Connection, "Connection"),
    (Header::Cookie, "Cookie"),
    (Header::ContentLength, "Content-Length"),
    (Header::ContentMd5, "Content-MD5"),
    (Header::ContentType, "Content-Type"),
    (Header::Date, "Date"),
    (Header::Expect, "Expect"),
    (Header::Forwarded, "Forwarded"),
    (Header::From, "From"),
    (Header::Host, "Host"),
    (Header::IfMatch, "If-Match"),
    (Header::IfModifiedSince, "If-Modified-Since"),
    (Header::IfNoneMatch, "If-None-Match"),
    (Header::IfRange, "If-Range"),
    (Header::IfUnmodifiedSince, "If-Unmodified-Since"),
    (Header::MaxForwards, "Max-Forwards"),
    (Header::Pragma, "Pragma"),
    (Header::ProxyAuthorization, "Proxy-Authorization"),
    (Header::Range, "Range"),
    (Header::Referer, "Referer"),
    (Header::Te, "TE"),
    (Header::UserAgent, "User-Agent"),
    (Header::Upgrade, "Upgrade"),
    (Header::XRequestedWith, "X-Requested-With"),
    (Header::Dnt, "DNT"),
    (Header::XForwardedFor, "X-Forwarded-For"),
    (Header::XForwardedHost, "X-Forwarded-Host"),
    (Header::XForwardedProto, "X-Forwarded-Proto"),
    (Header::FrontEndHttps, "Front-End-Https"),
    (Header::XHttpMethodOverride, "X-Http-Method-Override"),
    (Header::XAttDeviceId, "X-ATT-DeviceId"),
    (Header::XWapProfile, "X-Wap-Profile"),
    (Header::ProxyConnection, "Proxy-Connection"),
    (Header::XUidh, "X-UIDH"),
    (Header::XCsrfToken, "X-Csrf-Token"),
    (Header::XRequestId, "X-Request-ID"),
    (Header::XCorrelationId, "X-Correlation-ID"),
];

impl Header {
    /// Looks a header name up in the table, ignoring ASCII case.
    ///
    /// ```
    /// # use shttpd::http::headers::Header;
    /// assert_eq!(Header::lookup("content-length"), Some(Header::ContentLength));
    /// assert_eq!(Header::lookup("X-Custom"), None);
    /// ```
    pub fn lookup(name: &str) -> Option<Self> {
        TABLE
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map(|(header, _)| *header)
    }

    /// Canonical spelling of the header name.
    pub fn as_str(&self) -> &'static str {
        TABLE
            .iter()
            .find(|(header, _)| header == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    /// Every known header, in table order.
    pub fn all() -> impl Iterator<Item = Header> {
        TABLE.iter().map(|(header, _)| *header)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header values of a single request.
///
/// Known headers each own one slot; a repeated header overwrites the
/// previous value. Unknown headers are kept in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    known: HashMap<Header, String>,
    extra: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a header, routing it to its slot or to the extra list.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        match Header::lookup(name) {
            Some(header) => {
                self.known.insert(header, value.into());
            }
            None => self.extra.push((name.to_string(), value.into())),
        }
    }

    pub fn get(&self, header: Header) -> Option<&str> {
        self.known.get(&header).map(|v| v.as_str())
    }

    /// Finds a header by name, known or not.
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        match Header::lookup(name) {
            Some(header) => self.get(header),
            None => self
                .extra
                .iter()
                .rev()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Known headers that are set, in table order.
    pub fn known(&self) -> impl Iterator<Item = (Header, &str)> {
        Header::all().filter_map(|h| self.get(h).map(|v| (h, v)))
    }

    pub fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trips_names() {
        for header in Header::all() {
            assert_eq!(Header::lookup(header.as_str()), Some(header));
        }
    }

    #[test]
    fn last_value_wins() {
        let mut map = HeaderMap::new();
        map.insert("Host", "a");
        map.insert("host", "b");
        assert_eq!(map.get(Header::Host), Some("b"));
        assert_eq!(map.len(), 1);
    }
}
