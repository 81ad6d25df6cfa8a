//! AuthnRequest wire parsing.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{SamlError, SamlResult};

/// Upper bound on the ID attribute; anything longer is abuse, not SAML.
const MAX_REQUEST_ID_LENGTH: usize = 256;

/// Upper bound on the Issuer element value.
const MAX_ISSUER_LENGTH: usize = 1024;

/// A parsed `<samlp:AuthnRequest>`.
///
/// Untrusted until it has been validated against the issuer's registered
/// metadata; the engine does that before anything else touches it.
#[derive(Debug, Clone)]
pub struct ParsedAuthnRequest {
    /// Unique identifier of the request.
    pub id: String,
    /// SP entity ID from the Issuer element.
    pub issuer: String,
    /// ACS URL named by the request, if any.
    pub assertion_consumer_service_url: Option<String>,
    /// ACS index named by the request, if any.
    pub assertion_consumer_service_index: Option<u32>,
    /// Binding requested for the response.
    pub protocol_binding: Option<String>,
    /// When the SP issued the request.
    pub issue_instant: Option<DateTime<Utc>>,
    /// Destination attribute, if any.
    pub destination: Option<String>,
}

/// Parses an AuthnRequest from XML.
///
/// The scan matches on local names, so the same parser handles a bare
/// redirect-binding document and an AuthnRequest wrapped in a SOAP envelope
/// (the ECP inbound message).
pub fn parse_authn_request(xml: &str) -> SamlResult<ParsedAuthnRequest> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut id = None;
    let mut issuer: Option<String> = None;
    let mut acs_url = None;
    let mut acs_index = None;
    let mut protocol_binding = None;
    let mut issue_instant = None;
    let mut destination = None;
    let mut seen_request = false;
    let mut in_issuer = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"AuthnRequest" => {
                        seen_request = true;
                        for attr in e.attributes().flatten() {
                            let value = attr.unescape_value().unwrap_or_default();
                            match attr.key.as_ref() {
                                b"ID" => id = Some(value.to_string()),
                                b"IssueInstant" => {
                                    issue_instant = DateTime::parse_from_rfc3339(&value)
                                        .ok()
                                        .map(|dt| dt.with_timezone(&Utc));
                                }
                                b"AssertionConsumerServiceURL" => {
                                    acs_url = Some(value.to_string());
                                }
                                b"AssertionConsumerServiceIndex" => {
                                    acs_index = value.parse::<u32>().ok();
                                }
                                b"ProtocolBinding" => {
                                    protocol_binding = Some(value.to_string());
                                }
                                b"Destination" => destination = Some(value.to_string()),
                                _ => {}
                            }
                        }
                    }
                    b"Issuer" if seen_request => in_issuer = true,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_issuer {
                    issuer = Some(e.unescape().unwrap_or_default().to_string());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"Issuer" {
                    in_issuer = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SamlError::MalformedXml(e.to_string())),
            _ => {}
        }
    }

    if !seen_request {
        return Err(SamlError::MissingElement("AuthnRequest".to_string()));
    }
    let id = id.ok_or_else(|| SamlError::MissingElement("AuthnRequest ID".to_string()))?;
    if id.len() > MAX_REQUEST_ID_LENGTH {
        return Err(SamlError::BadForm(format!(
            "request ID exceeds {MAX_REQUEST_ID_LENGTH} characters"
        )));
    }
    if let Some(issuer) = &issuer {
        if issuer.len() > MAX_ISSUER_LENGTH {
            return Err(SamlError::BadForm(format!(
                "issuer exceeds {MAX_ISSUER_LENGTH} characters"
            )));
        }
    }

    Ok(ParsedAuthnRequest {
        id,
        issuer: issuer.unwrap_or_default(),
        assertion_consumer_service_url: acs_url,
        assertion_consumer_service_index: acs_index,
        protocol_binding,
        issue_instant,
        destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
    ID="_abc123" Version="2.0"
    IssueInstant="2024-05-01T10:00:00Z"
    AssertionConsumerServiceURL="https://sp.example/acs"
    AssertionConsumerServiceIndex="1"
    ProtocolBinding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST">
    <saml:Issuer>https://sp.example/</saml:Issuer>
</samlp:AuthnRequest>"#;

    #[test]
    fn parses_all_fields() {
        let parsed = parse_authn_request(SAMPLE).unwrap();
        assert_eq!(parsed.id, "_abc123");
        assert_eq!(parsed.issuer, "https://sp.example/");
        assert_eq!(
            parsed.assertion_consumer_service_url.as_deref(),
            Some("https://sp.example/acs")
        );
        assert_eq!(parsed.assertion_consumer_service_index, Some(1));
        assert_eq!(
            parsed.protocol_binding.as_deref(),
            Some("urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST")
        );
        assert!(parsed.issue_instant.is_some());
    }

    #[test]
    fn missing_id_is_rejected() {
        let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol">
            <Issuer>https://sp.example/</Issuer>
        </samlp:AuthnRequest>"#;
        assert!(matches!(
            parse_authn_request(xml),
            Err(SamlError::MissingElement(_))
        ));
    }

    #[test]
    fn missing_issuer_yields_empty_string() {
        let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_x"/>"#;
        let parsed = parse_authn_request(xml).unwrap();
        assert!(parsed.issuer.is_empty());
    }

    #[test]
    fn parses_soap_wrapped_request() {
        let xml = format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{}</soap:Body></soap:Envelope>"#,
            SAMPLE.trim_start_matches(r#"<?xml version="1.0" encoding="UTF-8"?>"#)
        );
        let parsed = parse_authn_request(&xml).unwrap();
        assert_eq!(parsed.id, "_abc123");
        assert_eq!(parsed.issuer, "https://sp.example/");
    }

    #[test]
    fn non_xml_is_rejected() {
        assert!(parse_authn_request("this is not xml <<<").is_err());
    }
}
