pub mod event;

/// Opaque bearer token handed out at login and stored in the key-value
/// store together with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);
