pub mod command_loop;
pub mod session;

pub use command_loop::{CommandLoop, LoopExit};
pub use session::Session;
