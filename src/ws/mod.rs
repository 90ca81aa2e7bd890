pub mod clipboard;
pub mod engine;
pub mod gateway;
pub mod membership;
pub mod registry;
pub mod room;
pub mod session;
pub mod tag;

pub use gateway::SessionGateway;
pub use registry::RoomRegistry;
pub use session::{Link, Session, SessionId, SessionState};
pub use tag::RoomTag;
