//! HTTP-POST binding pages.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Renders the auto-submitting form that delivers a Response to the ACS.
///
/// The `SAMLResponse` field carries the base64 of the signed Response
/// document; `RelayState` is echoed when present.
#[must_use]
pub fn response_post_page(response_xml: &str, acs_url: &str, relay_state: Option<&str>) -> String {
    let encoded = BASE64.encode(response_xml);
    let relay_state_input = relay_state
        .map(|rs| {
            format!(
                r#"<input type="hidden" name="RelayState" value="{}"/>"#,
                html_escape(rs)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>SAML POST Binding</title></head>
<body onload="document.forms[0].submit()">
<noscript><p>JavaScript is disabled. Click the button below to continue.</p></noscript>
<form method="post" action="{action}">
<input type="hidden" name="SAMLResponse" value="{response}"/>
{relay_state}<noscript><input type="submit" value="Continue"/></noscript>
</form>
</body>
</html>"#,
        action = html_escape(acs_url),
        response = encoded,
        relay_state = relay_state_input,
    )
}

/// CSP source expression for the inline script in [`logout_post_page`]:
/// `sha256-` over the exact script body. The SLO handler pins `script-src`
/// to this value, so nothing injected into the page can execute.
pub const LOGOUT_SCRIPT_CSP_HASH: &str = "sha256-AjPdJSbZmeWHnEc5ykvJFay8FTWeTeRbs9dutfZ0HqE=";

/// Renders the logout page for the HTTP-POST SLO binding.
///
/// The form posts the SP-supplied `logoutResponse` payload back to its single
/// logout service and submits itself. The script body must stay byte-stable;
/// [`LOGOUT_SCRIPT_CSP_HASH`] covers exactly these octets.
#[must_use]
pub fn logout_post_page(slo_url: &str, logout_response: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><body>",
            r#"<form method="post" action="{url}" id="SAMLRequestForm">"#,
            r#"<input type="hidden" name="logoutResponse" value="{response}"/>"#,
            r#"<input id="SAMLSubmitButton" type="submit" value="Submit"/>"#,
            "</form>",
            r#"<script>document.getElementById('SAMLSubmitButton').style.visibility="hidden";"#,
            "document.getElementById('SAMLRequestForm').submit();</script>",
            "</body></html>"
        ),
        url = html_escape(slo_url),
        response = html_escape(logout_response),
    )
}

/// Escapes HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_page_embeds_base64_response() {
        let page = response_post_page("<samlp:Response/>", "https://sp.example/acs", Some("st"));
        assert!(page.contains(r#"action="https://sp.example/acs""#));
        assert!(page.contains(&BASE64.encode("<samlp:Response/>")));
        assert!(page.contains(r#"name="RelayState" value="st""#));
        assert!(page.contains("document.forms[0].submit()"));
    }

    #[test]
    fn relay_state_is_omitted_when_absent() {
        let page = response_post_page("<x/>", "https://sp.example/acs", None);
        assert!(!page.contains("RelayState"));
    }

    #[test]
    fn pages_escape_injected_markup() {
        let page = response_post_page("<x/>", r#"https://sp.example/"><script>"#, None);
        assert!(!page.contains(r#""><script>"#));

        let logout = logout_post_page("https://sp.example/slo", r#""/><script>x</script>"#);
        assert!(!logout.contains("<script>x</script>"));
    }

    #[test]
    fn logout_page_targets_slo_url() {
        let page = logout_post_page("https://sp.example/slo", "payload");
        assert!(page.contains(r#"action="https://sp.example/slo""#));
        assert!(page.contains(r#"name="logoutResponse" value="payload""#));
    }

    #[test]
    fn csp_hash_covers_the_inline_script() {
        let page = logout_post_page("https://sp.example/slo", "payload");
        let start = page.find("<script>").unwrap() + "<script>".len();
        let end = page.find("</script>").unwrap();

        let digest = openssl::hash::hash(
            openssl::hash::MessageDigest::sha256(),
            page[start..end].as_bytes(),
        )
        .unwrap();
        assert_eq!(
            format!("sha256-{}", BASE64.encode(digest)),
            LOGOUT_SCRIPT_CSP_HASH
        );
    }
}
