pub mod clip;
pub mod diagnostics;
pub mod error;
pub mod file;
pub mod health;
pub mod messages;
pub mod payload;
pub mod ready;
pub mod room;

pub use clip::*;
pub use diagnostics::*;
pub use error::*;
pub use file::*;
pub use health::*;
pub use messages::*;
pub use payload::*;
pub use ready::*;
pub use room::*;
