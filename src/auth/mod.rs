//! Session relay authentication.
//!
//! The backend issues an access/refresh token pair; the relay keeps both in
//! httpOnly cookies and asks the backend who the user is (`GET /auth/me`)
//! whenever a page needs gating. No session state lives on this server.

mod cookie;
mod errors;
mod extractors;
mod gate;
mod ip;
mod state;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_session_cookies, get_cookie,
    issued_session_cookies, session_cookie,
};
pub use errors::{ApiAuthError, AuthErrorKind, GateRedirect};
pub use extractors::{
    AccessToken, AgentOnly, DashboardPage, GuestPage, OrganizationAdminOnly, RefreshToken,
    RoleConstraint, SuperAdminOnly,
};
pub use gate::{GateDecision, LOGIN_PATH, current_user, gate_dashboard, gate_guest_page};
pub use ip::{HasHeadersAndExtensions, IpSource, extract_client_ip};
pub use state::{HasAuthBackend, ServerSettings};
