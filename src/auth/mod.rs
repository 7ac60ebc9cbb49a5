pub mod cookie;
pub mod provider;
pub mod session;

pub use provider::{IdentityProvider, OAuthProvider, ProviderError};
pub use session::{
    ExpiryPolicy, FixedLifetime, Identity, MemorySessionStore, Session, SessionError, SessionStore,
};
