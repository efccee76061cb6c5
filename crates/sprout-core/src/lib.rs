pub mod accounts;
pub mod error;
pub mod messages;
pub mod progress;
pub mod session;
pub mod sync;

pub use accounts::Accounts;
pub use error::CoreError;
pub use messages::MessageStore;
pub use progress::ProgressRepo;
pub use session::Session;
pub use sync::SyncHandle;
