pub mod error;
pub mod events;
pub mod user;

pub use error::{BatchError, Result};
pub use events::{BatchStatus, ExecutionEvent};
pub use user::{Grade, SocialType, UserRecord, UserRecordBuilder, UserStatus};
