//! LogoutRequest wire parsing.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{SamlError, SamlResult};

/// A parsed `<samlp:LogoutRequest>`.
#[derive(Debug, Clone)]
pub struct ParsedLogoutRequest {
    /// Unique identifier of the request.
    pub id: String,
    /// SP entity ID from the Issuer element.
    pub issuer: String,
    /// Subject being logged out, if named.
    pub name_id: Option<String>,
    /// Expiry of the request itself.
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// SLO URL named by the request, if any.
    pub single_logout_service_url: Option<String>,
    /// Binding requested for the logout response, if any.
    pub protocol_binding: Option<String>,
    /// Pre-built logout response payload, if the SP supplied one.
    pub logout_response: Option<String>,
}

/// Parses a LogoutRequest from XML.
pub fn parse_logout_request(xml: &str) -> SamlResult<ParsedLogoutRequest> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut id = None;
    let mut issuer = None;
    let mut name_id = None;
    let mut not_on_or_after = None;
    let mut slo_url = None;
    let mut protocol_binding = None;
    let mut logout_response = None;
    let mut seen_request = false;
    let mut in_issuer = false;
    let mut in_name_id = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"LogoutRequest" => {
                    seen_request = true;
                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().unwrap_or_default();
                        match attr.key.as_ref() {
                            b"ID" => id = Some(value.to_string()),
                            b"NotOnOrAfter" => {
                                not_on_or_after = DateTime::parse_from_rfc3339(&value)
                                    .ok()
                                    .map(|dt| dt.with_timezone(&Utc));
                            }
                            b"SingleLogoutServiceUrl" => slo_url = Some(value.to_string()),
                            b"ProtocolBinding" => protocol_binding = Some(value.to_string()),
                            b"LogoutResponse" => logout_response = Some(value.to_string()),
                            _ => {}
                        }
                    }
                }
                b"Issuer" if seen_request => in_issuer = true,
                b"NameID" if seen_request => in_name_id = true,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if in_issuer {
                    issuer = Some(text);
                } else if in_name_id {
                    name_id = Some(text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"Issuer" => in_issuer = false,
                b"NameID" => in_name_id = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SamlError::MalformedXml(e.to_string())),
            _ => {}
        }
    }

    if !seen_request {
        return Err(SamlError::MissingElement("LogoutRequest".to_string()));
    }
    let id = id.ok_or_else(|| SamlError::MissingElement("LogoutRequest ID".to_string()))?;

    Ok(ParsedLogoutRequest {
        id,
        issuer: issuer.unwrap_or_default(),
        name_id,
        not_on_or_after,
        single_logout_service_url: slo_url,
        protocol_binding,
        logout_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_logout_request() {
        let xml = r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="_lo1" Version="2.0" IssueInstant="2024-05-01T10:00:00Z"
            NotOnOrAfter="2024-05-01T10:05:00Z"
            ProtocolBinding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST">
            <saml:Issuer>https://sp.example/</saml:Issuer>
            <saml:NameID>alice</saml:NameID>
        </samlp:LogoutRequest>"#;

        let parsed = parse_logout_request(xml).unwrap();
        assert_eq!(parsed.id, "_lo1");
        assert_eq!(parsed.issuer, "https://sp.example/");
        assert_eq!(parsed.name_id.as_deref(), Some("alice"));
        assert!(parsed.not_on_or_after.is_some());
        assert_eq!(
            parsed.protocol_binding.as_deref(),
            Some("urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST")
        );
    }

    #[test]
    fn wrong_root_is_rejected() {
        let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_x"/>"#;
        assert!(parse_logout_request(xml).is_err());
    }
}
