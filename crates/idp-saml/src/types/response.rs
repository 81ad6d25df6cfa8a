//! Response and assertion rendering.
//!
//! Documents are rendered without inter-element whitespace so the octets the
//! signer digests are already in canonical form. The assertion is rendered
//! once, signed in place, and embedded verbatim into whatever carries it
//! (Response, ArtifactResponse envelope, ECP envelope).

use chrono::{DateTime, Duration, Utc};
use idp_model::User;

use crate::error::SamlResult;
use crate::signature::AssertionSigner;
use crate::types::{
    confirmation_methods, new_saml_id, status_codes, xml_escape, SAML_NS, SAMLP_NS, SOAP_ACTOR_NEXT,
    SOAP_NS,
};

/// XML prologue for SOAP responses.
const XML_PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// How long assertions and their subject confirmations stay valid.
const VALIDITY: i64 = 5;

/// Inputs for building a signed authentication response.
#[derive(Debug)]
pub struct AuthnResponseParams<'a> {
    /// IdP entity ID (issuer of response and assertion).
    pub entity_id: &'a str,
    /// IdP server name, emitted as the subject locality DNS name.
    pub server_name: &'a str,
    /// SP entity ID (audience and SPNameQualifier).
    pub sp_entity_id: &'a str,
    /// The request ID being answered.
    pub in_response_to: &'a str,
    /// The ACS location the response is addressed to.
    pub recipient: &'a str,
    /// The authenticated subject.
    pub user: &'a User,
    /// NameFormat attribute for emitted SAML attributes.
    pub attribute_name_format: &'a str,
}

/// A rendered, signed SAML Response.
#[derive(Debug, Clone)]
pub struct SignedResponse {
    /// The Response ID.
    pub id: String,
    /// The complete Response document (no XML prologue).
    pub xml: String,
}

/// Builds signed SAML responses and the envelopes that carry them.
pub struct ResponseBuilder<'a> {
    signer: &'a AssertionSigner,
}

impl<'a> ResponseBuilder<'a> {
    /// Creates a builder around the IdP's signer.
    #[must_use]
    pub fn new(signer: &'a AssertionSigner) -> Self {
        Self { signer }
    }

    /// Builds a signed Response answering an authentication request.
    ///
    /// The assertion carries the subject, bearer confirmation, conditions
    /// with a five-minute window, the authentication statement, and the
    /// user's attributes, and is signed before the response wraps it.
    pub fn build_authn_response(
        &self,
        params: &AuthnResponseParams<'_>,
    ) -> SamlResult<SignedResponse> {
        let now = Utc::now();
        let assertion_id = new_saml_id();
        let assertion = render_assertion(&assertion_id, now, params);
        let signed_assertion = self.signer.sign_assertion(&assertion, &assertion_id)?;

        let response_id = new_saml_id();
        let xml = format!(
            concat!(
                r#"<samlp:Response xmlns:samlp="{samlp}" ID="{id}" Version="2.0" IssueInstant="{instant}" Destination="{destination}" InResponseTo="{in_response_to}">"#,
                r#"<saml:Issuer xmlns:saml="{saml}">{issuer}</saml:Issuer>"#,
                r#"<samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status>"#,
                "{assertion}",
                "</samlp:Response>"
            ),
            samlp = SAMLP_NS,
            id = response_id,
            instant = instant(now),
            destination = xml_escape(params.recipient),
            in_response_to = xml_escape(params.in_response_to),
            saml = SAML_NS,
            issuer = xml_escape(params.entity_id),
            status = status_codes::SUCCESS,
            assertion = signed_assertion,
        );

        Ok(SignedResponse {
            id: response_id,
            xml,
        })
    }

    /// Wraps a signed Response in an ArtifactResponse SOAP envelope.
    ///
    /// `in_response_to` is the ArtifactResolve message's ID.
    #[must_use]
    pub fn build_artifact_response_envelope(
        &self,
        entity_id: &str,
        in_response_to: &str,
        response_xml: &str,
    ) -> String {
        format!(
            concat!(
                "{prologue}",
                r#"<soap:Envelope xmlns:soap="{soap}"><soap:Body>"#,
                r#"<samlp:ArtifactResponse xmlns:samlp="{samlp}" ID="{id}" Version="2.0" IssueInstant="{instant}" InResponseTo="{in_response_to}">"#,
                r#"<saml:Issuer xmlns:saml="{saml}">{issuer}</saml:Issuer>"#,
                r#"<samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status>"#,
                "{response}",
                "</samlp:ArtifactResponse>",
                "</soap:Body></soap:Envelope>"
            ),
            prologue = XML_PROLOGUE,
            soap = SOAP_NS,
            samlp = SAMLP_NS,
            id = new_saml_id(),
            instant = instant(Utc::now()),
            in_response_to = xml_escape(in_response_to),
            saml = SAML_NS,
            issuer = xml_escape(entity_id),
            status = status_codes::SUCCESS,
            response = response_xml,
        )
    }

    /// Wraps a signed Response in an ECP SOAP envelope.
    #[must_use]
    pub fn build_ecp_envelope(&self, acs_url: &str, response_xml: &str) -> String {
        format!(
            concat!(
                "{prologue}",
                r#"<soap:Envelope xmlns:soap="{soap}">"#,
                "<soap:Header>",
                r#"<ecp:Response xmlns:ecp="{ecp}" soap:actor="{actor}" soap:mustUnderstand="1" AssertionConsumerServiceURL="{acs}"/>"#,
                r#"<ecp:RequestAuthenticated xmlns:ecp="{ecp}" soap:actor="{actor}"/>"#,
                "</soap:Header>",
                "<soap:Body>{response}</soap:Body>",
                "</soap:Envelope>"
            ),
            prologue = XML_PROLOGUE,
            soap = SOAP_NS,
            ecp = crate::types::ECP_NS,
            actor = SOAP_ACTOR_NEXT,
            acs = xml_escape(acs_url),
            response = response_xml,
        )
    }

    /// Wraps a signed Response in a plain SOAP envelope (attribute queries).
    #[must_use]
    pub fn build_soap_envelope(&self, response_xml: &str) -> String {
        format!(
            concat!(
                "{prologue}",
                r#"<soap:Envelope xmlns:soap="{soap}"><soap:Body>{response}</soap:Body></soap:Envelope>"#,
            ),
            prologue = XML_PROLOGUE,
            soap = SOAP_NS,
            response = response_xml,
        )
    }
}

fn instant(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn render_assertion(id: &str, now: DateTime<Utc>, params: &AuthnResponseParams<'_>) -> String {
    let not_on_or_after = instant(now + Duration::minutes(VALIDITY));
    let now_s = instant(now);
    let user = params.user;

    let mut assertion = format!(
        concat!(
            r#"<saml:Assertion xmlns:saml="{saml}" ID="{id}" Version="2.0" IssueInstant="{instant}">"#,
            "<saml:Issuer>{issuer}</saml:Issuer>",
            "<saml:Subject>",
            r#"<saml:NameID Format="{format}" NameQualifier="{name_qualifier}" SPNameQualifier="{sp_name_qualifier}">{name}</saml:NameID>"#,
            r#"<saml:SubjectConfirmation Method="{method}">"#,
            r#"<saml:SubjectConfirmationData Address="{address}" InResponseTo="{in_response_to}" Recipient="{recipient}" NotOnOrAfter="{expiry}"/>"#,
            "</saml:SubjectConfirmation>",
            "</saml:Subject>",
            r#"<saml:Conditions NotBefore="{instant}" NotOnOrAfter="{expiry}">"#,
            "<saml:AudienceRestriction><saml:Audience>{audience}</saml:Audience></saml:AudienceRestriction>",
            "</saml:Conditions>",
            r#"<saml:AuthnStatement AuthnInstant="{instant}" SessionIndex="{session_index}">"#,
            r#"<saml:SubjectLocality DNSName="{dns_name}"/>"#,
            "<saml:AuthnContext><saml:AuthnContextClassRef>{context}</saml:AuthnContextClassRef></saml:AuthnContext>",
            "</saml:AuthnStatement>"
        ),
        saml = SAML_NS,
        id = id,
        instant = now_s,
        issuer = xml_escape(params.entity_id),
        format = xml_escape(&user.format),
        name_qualifier = xml_escape(params.entity_id),
        sp_name_qualifier = xml_escape(params.sp_entity_id),
        name = xml_escape(&user.name),
        method = confirmation_methods::BEARER,
        address = xml_escape(&user.ip),
        in_response_to = xml_escape(params.in_response_to),
        recipient = xml_escape(params.recipient),
        expiry = not_on_or_after,
        audience = xml_escape(params.sp_entity_id),
        session_index = new_saml_id(),
        dns_name = xml_escape(params.server_name),
        context = xml_escape(&user.context),
    );

    if !user.attributes.is_empty() {
        assertion.push_str("<saml:AttributeStatement>");
        for attribute in &user.attributes {
            assertion.push_str(&format!(
                r#"<saml:Attribute Name="{}" NameFormat="{}">"#,
                xml_escape(&attribute.name),
                xml_escape(params.attribute_name_format),
            ));
            for value in &attribute.values {
                assertion.push_str(&format!(
                    "<saml:AttributeValue>{}</saml:AttributeValue>",
                    xml_escape(value)
                ));
            }
            assertion.push_str("</saml:Attribute>");
        }
        assertion.push_str("</saml:AttributeStatement>");
    }

    assertion.push_str("</saml:Assertion>");
    assertion
}

#[cfg(test)]
mod tests {
    use idp_model::Attribute;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509Builder, X509NameBuilder};

    use super::*;

    fn test_signer() -> AssertionSigner {
        let rsa = Rsa::generate(2048).unwrap();
        let key = PKey::from_rsa(rsa).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "idp.test").unwrap();
        let name = name.build();
        let mut builder = X509Builder::new().unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&openssl::asn1::Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&openssl::asn1::Asn1Time::days_from_now(1).unwrap())
            .unwrap();
        builder
            .sign(&key, openssl::hash::MessageDigest::sha256())
            .unwrap();
        AssertionSigner::new(key, builder.build()).unwrap()
    }

    fn test_user() -> User {
        User {
            name: "alice".to_string(),
            format: "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified".to_string(),
            context: "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport"
                .to_string(),
            ip: "203.0.113.7".to_string(),
            x509_certificate: None,
            attributes: vec![Attribute::new("uid", "alice")],
        }
    }

    fn params<'a>(user: &'a User) -> AuthnResponseParams<'a> {
        AuthnResponseParams {
            entity_id: "https://idp.test/",
            server_name: "idp.test",
            sp_entity_id: "https://sp.example/",
            in_response_to: "_abc",
            recipient: "https://sp.example/acs",
            user,
            attribute_name_format: "urn:oasis:names:tc:SAML:2.0:attrname-format:basic",
        }
    }

    #[test]
    fn response_carries_request_linkage() {
        let signer = test_signer();
        let user = test_user();
        let response = ResponseBuilder::new(&signer)
            .build_authn_response(&params(&user))
            .unwrap();

        assert!(response.xml.contains(r#"InResponseTo="_abc""#));
        assert!(response.xml.contains(r#"Destination="https://sp.example/acs""#));
        assert!(response
            .xml
            .contains("<saml:Audience>https://sp.example/</saml:Audience>"));
        assert!(response.xml.contains(r#"SPNameQualifier="https://sp.example/""#));
        assert!(response.xml.contains(">alice</saml:NameID>"));
        assert!(response.xml.contains("PasswordProtectedTransport"));
        assert!(response
            .xml
            .contains("urn:oasis:names:tc:SAML:2.0:status:Success"));
    }

    #[test]
    fn assertion_inside_response_is_signed() {
        let signer = test_signer();
        let user = test_user();
        let response = ResponseBuilder::new(&signer)
            .build_authn_response(&params(&user))
            .unwrap();

        let assertion_at = response.xml.find("<saml:Assertion").unwrap();
        let signature_at = response.xml.find("<ds:Signature").unwrap();
        assert!(signature_at > assertion_at);
        assert!(response.xml.contains("<ds:DigestValue>"));
    }

    #[test]
    fn attributes_are_emitted_in_order() {
        let signer = test_signer();
        let mut user = test_user();
        user.attributes
            .push(Attribute::multi("memberUid", vec!["a".into(), "b".into()]));
        let response = ResponseBuilder::new(&signer)
            .build_authn_response(&params(&user))
            .unwrap();

        let uid_at = response.xml.find(r#"Name="uid""#).unwrap();
        let member_at = response.xml.find(r#"Name="memberUid""#).unwrap();
        assert!(uid_at < member_at);
    }

    #[test]
    fn artifact_envelope_embeds_response_verbatim() {
        let signer = test_signer();
        let user = test_user();
        let builder = ResponseBuilder::new(&signer);
        let response = builder.build_authn_response(&params(&user)).unwrap();

        let envelope =
            builder.build_artifact_response_envelope("https://idp.test/", "_resolve1", &response.xml);
        assert!(envelope.starts_with(XML_PROLOGUE));
        assert!(envelope.contains(r#"InResponseTo="_resolve1""#));
        assert!(envelope.contains(&response.xml));
    }

    #[test]
    fn ecp_envelope_carries_headers() {
        let signer = test_signer();
        let builder = ResponseBuilder::new(&signer);
        let envelope = builder.build_ecp_envelope("https://sp.example/acs", "<samlp:Response/>");
        assert!(envelope.contains(r#"soap:mustUnderstand="1""#));
        assert!(envelope.contains(r#"AssertionConsumerServiceURL="https://sp.example/acs""#));
        assert!(envelope.contains("<ecp:RequestAuthenticated"));
    }
}
