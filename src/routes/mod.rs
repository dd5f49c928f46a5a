/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// This structure ensures that access control is applied explicitly at the
/// module level (via Axum layers), preventing accidental exposure of protected
/// endpoints.
///
/// The three modules map directly to the defined access tiers.

/// Routes accessible to all visitors: landing page, registration, login,
/// logout and the public user listing.
pub mod public;

/// Routes protected by the authentication middleware layer.
/// Requires a session bound to an existing user.
pub mod authenticated;

/// Routes restricted exclusively to users with the 'admin' role.
/// The role gate is a router-level middleware layer.
pub mod admin;
