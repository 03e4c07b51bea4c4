//! Authentication state traits and macro.

use crate::upstream::UpstreamClient;

/// Immutable per-server settings shared by every route state.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    /// Whether session cookies carry the `Secure` attribute (production)
    pub secure_cookies: bool,
}

/// Trait for state types that can resolve the current session against the backend.
pub trait HasAuthBackend {
    fn upstream(&self) -> &UpstreamClient;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have an `upstream: UpstreamClient` field.
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub upstream: UpstreamClient,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn upstream(&self) -> &$crate::upstream::UpstreamClient {
                &self.upstream
            }
        }
    };
}
