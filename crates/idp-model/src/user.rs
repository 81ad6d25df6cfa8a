//! Authenticated user model.
//!
//! A [`User`] is created by one of the authenticators (password form, TLS
//! client certificate, ECP Basic credentials) and lives in the user cache for
//! the duration of the session. The attribute list is ordered: sources append
//! to it and the assertion emits it in the same order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A SAML attribute carried in the assertion's attribute statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute values (multi-valued attributes are common).
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates a new single-valued attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![value.into()],
        }
    }

    /// Creates a new multi-valued attribute.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Gets the first value, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// An authenticated subject.
///
/// `format` is the SAML NameID format URI describing `name`; `context` is the
/// AuthnContextClassRef URI describing how the subject authenticated. Both
/// flow verbatim into the assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Subject name (username, or the certificate subject DN for PKI logins).
    pub name: String,
    /// NameID format URI.
    pub format: String,
    /// AuthnContextClassRef URI.
    pub context: String,
    /// Client IP address observed at authentication time.
    pub ip: String,
    /// DER-encoded client certificate, present for PKI logins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_certificate: Option<Vec<u8>>,
    /// Ordered attribute list for the assertion's attribute statement.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl User {
    /// Appends attributes, preserving the order they are supplied in.
    pub fn append_attributes(&mut self, attrs: impl IntoIterator<Item = Attribute>) {
        self.attributes.extend(attrs);
    }

    /// Appends one attribute per map entry.
    ///
    /// Used by the password path, where the validator hands back a map of
    /// directory attributes.
    pub fn append_attribute_map(&mut self, attrs: HashMap<String, Vec<String>>) {
        let mut entries: Vec<_> = attrs.into_iter().collect();
        // Map iteration order is unspecified; sort so assertions are stable.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, values) in entries {
            self.attributes.push(Attribute { name, values });
        }
    }
}

/// The kind of credential a successful login used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginType {
    /// TLS client certificate.
    Certificate,
    /// Password form or ECP Basic credentials.
    Password,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            name: "alice".to_string(),
            format: "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified".to_string(),
            context: "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport"
                .to_string(),
            ip: "203.0.113.7".to_string(),
            x509_certificate: None,
            attributes: Vec::new(),
        }
    }

    #[test]
    fn attribute_order_is_preserved() {
        let mut user = test_user();
        user.append_attributes([
            Attribute::new("uid", "alice"),
            Attribute::multi("memberUid", vec!["staff".to_string(), "admins".to_string()]),
        ]);
        user.append_attributes([Attribute::new("mail", "alice@example.com")]);

        let names: Vec<_> = user.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["uid", "memberUid", "mail"]);
    }

    #[test]
    fn attribute_map_is_sorted_by_name() {
        let mut user = test_user();
        let mut map = HashMap::new();
        map.insert("uid".to_string(), vec!["alice".to_string()]);
        map.insert("cn".to_string(), vec!["Alice".to_string()]);
        map.insert("mail".to_string(), vec!["alice@example.com".to_string()]);
        user.append_attribute_map(map);

        let names: Vec<_> = user.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["cn", "mail", "uid"]);
    }

    #[test]
    fn user_roundtrips_through_json() {
        let mut user = test_user();
        user.append_attributes([Attribute::new("uid", "alice")]);

        let bytes = serde_json::to_vec(&user).unwrap();
        let decoded: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, user);
    }
}
