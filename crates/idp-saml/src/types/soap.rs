//! SOAP-carried request parsing: ArtifactResolve and AttributeQuery.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{SamlError, SamlResult};

/// A parsed SOAP-wrapped `<samlp:ArtifactResolve>`.
#[derive(Debug, Clone)]
pub struct ParsedArtifactResolve {
    /// Unique identifier of the resolve request, echoed as `InResponseTo`.
    pub id: String,
    /// Requester entity ID, if present.
    pub issuer: Option<String>,
    /// The artifact being resolved (base64, 44 decoded bytes).
    pub artifact: String,
}

/// Parses an ArtifactResolve from a SOAP envelope.
pub fn parse_artifact_resolve(xml: &str) -> SamlResult<ParsedArtifactResolve> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut id = None;
    let mut issuer = None;
    let mut artifact = None;
    let mut seen_resolve = false;
    let mut in_issuer = false;
    let mut in_artifact = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"ArtifactResolve" => {
                    seen_resolve = true;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"ID" {
                            id = Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                }
                b"Issuer" if seen_resolve => in_issuer = true,
                b"Artifact" if seen_resolve => in_artifact = true,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if in_issuer {
                    issuer = Some(text);
                } else if in_artifact {
                    artifact = Some(text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"Issuer" => in_issuer = false,
                b"Artifact" => in_artifact = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SamlError::MalformedXml(e.to_string())),
            _ => {}
        }
    }

    if !seen_resolve {
        return Err(SamlError::MissingElement("ArtifactResolve".to_string()));
    }

    Ok(ParsedArtifactResolve {
        id: id.ok_or_else(|| SamlError::MissingElement("ArtifactResolve ID".to_string()))?,
        issuer,
        artifact: artifact
            .ok_or_else(|| SamlError::MissingElement("Artifact".to_string()))?,
    })
}

/// A parsed SOAP-wrapped `<samlp:AttributeQuery>`.
#[derive(Debug, Clone)]
pub struct ParsedAttributeQuery {
    /// Unique identifier of the query, echoed as `InResponseTo`.
    pub id: String,
    /// Requester entity ID, if present.
    pub issuer: Option<String>,
    /// Queried subject name.
    pub subject: String,
    /// NameID format of the queried subject, if present.
    pub subject_format: Option<String>,
}

/// Parses an AttributeQuery from a SOAP envelope.
pub fn parse_attribute_query(xml: &str) -> SamlResult<ParsedAttributeQuery> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut id = None;
    let mut issuer = None;
    let mut subject = None;
    let mut subject_format = None;
    let mut seen_query = false;
    let mut in_issuer = false;
    let mut in_name_id = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"AttributeQuery" => {
                    seen_query = true;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"ID" {
                            id = Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                }
                b"Issuer" if seen_query => in_issuer = true,
                b"NameID" if seen_query => {
                    in_name_id = true;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"Format" {
                            subject_format =
                                Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if in_issuer {
                    issuer = Some(text);
                } else if in_name_id {
                    subject = Some(text);
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

    if !seen_query {
        return Err(SamlError::MissingElement("AttributeQuery".to_string()));
    }

    Ok(ParsedAttributeQuery {
        id: id.ok_or_else(|| SamlError::MissingElement("AttributeQuery ID".to_string()))?,
        issuer,
        subject: subject.ok_or_else(|| SamlError::MissingElement("Subject NameID".to_string()))?,
        subject_format,
    })
}
