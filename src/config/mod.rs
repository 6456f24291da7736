pub mod briefing;

pub use briefing::{BriefingConfig, Credentials, TRANSPORT_MESSAGE_LIMIT};
