pub mod error;
pub mod guard;
pub mod manager;
pub mod state;
pub mod store;

pub use error::{AuthError, TokenStoreError};
pub use guard::{guard, Access, Route};
pub use manager::SessionManager;
pub use state::{SessionSnapshot, SessionStatus};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
