pub mod error;
pub mod signaling;

pub use error::CoreError;
pub use signaling::SignalingServer;
