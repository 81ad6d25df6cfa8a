//! Login auditing.

use idp_model::{AuthnRequest, LoginType, User};

/// Sink for successful-login events.
///
/// Invoked exactly once per successful authentication, before the response
/// is built. Implementations must not block the request path.
pub trait Auditor: Send + Sync {
    /// Records a successful login.
    fn log_success(&self, user: &User, request: &AuthnRequest, login_type: LoginType);
}

/// The default auditor: drops every event.
pub struct NullAuditor;

impl Auditor for NullAuditor {
    fn log_success(&self, _user: &User, _request: &AuthnRequest, _login_type: LoginType) {}
}
