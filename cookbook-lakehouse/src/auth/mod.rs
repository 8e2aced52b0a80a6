//! Authentication module: identities, credentials, session tokens and the role gate
//!
//! Built on Delta Lake; the directory actor owns the `identities` table.

pub mod accounts;
pub mod credentials;
pub mod directory;
pub mod flow;
pub mod gate;
pub mod token;
pub mod types;
pub mod validate;

pub use accounts::AccountService;
pub use credentials::CredentialStore;
pub use directory::{DirectoryActor, IdentityDirectory};
pub use flow::Authenticator;
pub use gate::{Access, AuthorizationGate, Operation};
pub use token::TokenService;
pub use types::{
    Identity, IdentityExtras, IdentityListing, IdentityPatch, IdentityQuery, IdentityView, Role,
    Session, SessionClaims,
};
pub use validate::SecretPolicy;
