mod api;
mod event;
mod message;

pub use api::*;
pub use event::{Event, GroupMessage, PrivateMessage, Sender};
pub use message::{MessageContent, MessageSegment};
