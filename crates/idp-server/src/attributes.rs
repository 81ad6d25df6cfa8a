//! Attribute assembly.
//!
//! After authentication, an ordered chain of sources appends attributes to
//! the user before the assertion is built. The default source is the static
//! `users` table from configuration; deployments with richer needs inject
//! their own sources at bootstrap.

use std::collections::HashMap;

use async_trait::async_trait;
use idp_model::{Attribute, AuthnRequest, User};
use idp_saml::SamlResult;

use crate::config::UserAttributes;

/// A supplier of additional attributes for an authenticated user.
#[async_trait]
pub trait AttributeSource: Send + Sync {
    /// Appends attributes to `user`. Ordering across the chain is preserved.
    async fn add_attributes(&self, user: &mut User, request: &AuthnRequest) -> SamlResult<()>;
}

/// The configuration-backed source: a static user→attribute table.
pub struct ConfigAttributeSource {
    users: HashMap<String, Vec<Attribute>>,
}

impl ConfigAttributeSource {
    /// Builds the source from the configured `users` entries.
    #[must_use]
    pub fn new(entries: &[UserAttributes]) -> Self {
        let mut users = HashMap::new();
        for entry in entries {
            let mut attributes: Vec<_> = entry
                .attributes
                .iter()
                .map(|(name, values)| Attribute {
                    name: name.clone(),
                    values: values.clone(),
                })
                .collect();
            // Map iteration order is unspecified; sort once here so every
            // login sees the same attribute order.
            attributes.sort_by(|a, b| a.name.cmp(&b.name));
            users.insert(entry.name.clone(), attributes);
        }
        Self { users }
    }
}

#[async_trait]
impl AttributeSource for ConfigAttributeSource {
    async fn add_attributes(&self, user: &mut User, _request: &AuthnRequest) -> SamlResult<()> {
        if let Some(attributes) = self.users.get(&user.name) {
            user.append_attributes(attributes.iter().cloned());
        }
        Ok(())
    }
}

/// Runs the chain in order.
pub async fn apply_attribute_sources(
    sources: &[std::sync::Arc<dyn AttributeSource>],
    user: &mut User,
    request: &AuthnRequest,
) -> SamlResult<()> {
    for source in sources {
        source.add_attributes(user, request).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn test_request() -> AuthnRequest {
        AuthnRequest {
            id: "_r".to_string(),
            issuer: "https://sp.example/".to_string(),
            assertion_consumer_service_url: "https://sp.example/acs".to_string(),
            assertion_consumer_service_index: None,
            protocol_binding: "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST".to_string(),
            relay_state: None,
            issue_instant: Utc::now(),
            destination: None,
        }
    }

    fn test_user(name: &str) -> User {
        User {
            name: name.to_string(),
            format: String::new(),
            context: String::new(),
            ip: String::new(),
            x509_certificate: None,
            attributes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn matching_user_gets_configured_attributes() {
        let mut attributes = HashMap::new();
        attributes.insert("role".to_string(), vec!["admin".to_string()]);
        let source = ConfigAttributeSource::new(&[UserAttributes {
            name: "alice".to_string(),
            attributes,
        }]);

        let mut user = test_user("alice");
        source
            .add_attributes(&mut user, &test_request())
            .await
            .unwrap();
        assert_eq!(user.attributes.len(), 1);
        assert_eq!(user.attributes[0].name, "role");
    }

    #[tokio::test]
    async fn other_users_are_untouched() {
        let source = ConfigAttributeSource::new(&[UserAttributes {
            name: "alice".to_string(),
            attributes: HashMap::new(),
        }]);
        let mut user = test_user("bob");
        source
            .add_attributes(&mut user, &test_request())
            .await
            .unwrap();
        assert!(user.attributes.is_empty());
    }
}
