pub mod clip;
pub mod diagnostics;
pub mod files;
pub mod health;
pub mod room;

pub use clip::*;
pub use diagnostics::*;
pub use files::*;
pub use health::*;
pub use room::*;
