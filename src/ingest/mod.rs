//! Device ingestion
//!
//! - **frame**: Validating decode of raw device frames
//! - **session**: Receive loop bound to one device connection
//!
//! Any transport can feed a session by implementing [`FrameSource`]; the
//! WebSocket adapter lives in [`crate::websocket`].

mod frame;
mod session;

pub use frame::{decode_frame, DecodeError, ImuFrame};
pub use session::{ChannelSource, FrameSource, IngestionSession, SessionStats};
