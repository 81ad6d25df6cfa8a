//! SAML binding codecs.
//!
//! - **HTTP-Redirect** - inbound requests arrive deflated, base64-encoded,
//!   and URL-encoded in query parameters.
//! - **HTTP-POST** - outbound responses are delivered as base64 form fields
//!   in auto-submitting HTML forms.

mod post;
mod redirect;

pub use post::{logout_post_page, response_post_page, LOGOUT_SCRIPT_CSP_HASH};
pub use redirect::{decode_redirect_message, encode_redirect_message};
