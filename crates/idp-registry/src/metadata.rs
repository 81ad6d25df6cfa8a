//! SP metadata parsing.

use idp_saml::{SamlError, SamlResult};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::sp::{Endpoint, ServiceProvider};

/// Parses an SP `EntityDescriptor` into a usable [`ServiceProvider`].
///
/// Requires an `SPSSODescriptor` carrying at least one
/// `KeyDescriptor/KeyInfo/X509Data/X509Certificate`; the certificate is
/// parsed before returning, so a successful result is immediately usable for
/// signature verification.
pub fn parse_sp_metadata(xml: &str) -> SamlResult<ServiceProvider> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entity_id = None;
    let mut in_sp_descriptor = false;
    let mut in_certificate = false;
    let mut certificate = None;
    let mut acs = Vec::new();
    let mut slo = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"EntityDescriptor" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"entityID" {
                            entity_id =
                                Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                }
                b"SPSSODescriptor" => in_sp_descriptor = true,
                b"X509Certificate" if in_sp_descriptor => in_certificate = true,
                b"AssertionConsumerService" if in_sp_descriptor => {
                    acs.push(parse_endpoint(&e));
                }
                b"SingleLogoutService" if in_sp_descriptor => {
                    slo.push(parse_endpoint(&e));
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_certificate && certificate.is_none() {
                    let text = e.unescape().unwrap_or_default().to_string();
                    certificate = Some(text.replace(['\n', '\r', ' ', '\t'], ""));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"SPSSODescriptor" => in_sp_descriptor = false,
                b"X509Certificate" => in_certificate = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SamlError::MalformedMetadata(e.to_string())),
            _ => {}
        }
    }

    let entity_id = entity_id
        .ok_or_else(|| SamlError::MalformedMetadata("no EntityDescriptor entityID".to_string()))?;
    if acs.is_empty() && slo.is_empty() {
        return Err(SamlError::MalformedMetadata(
            "no SPSSODescriptor endpoints".to_string(),
        ));
    }
    let certificate = certificate.ok_or(SamlError::MissingCertificate)?;

    let mut sp = ServiceProvider::new(entity_id, acs, slo, certificate);
    sp.parse_certificate()?;
    Ok(sp)
}

fn parse_endpoint(e: &quick_xml::events::BytesStart<'_>) -> Endpoint {
    let mut endpoint = Endpoint {
        index: 0,
        is_default: false,
        binding: String::new(),
        location: String::new(),
    };
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().unwrap_or_default();
        match attr.key.as_ref() {
            b"index" => endpoint.index = value.parse().unwrap_or(0),
            b"isDefault" => endpoint.is_default = value == "true" || value == "1",
            b"Binding" => endpoint.binding = value.to_string(),
            b"Location" => endpoint.location = value.to_string(),
            _ => {}
        }
    }
    endpoint
}
