pub mod init;
pub mod replay;
pub mod resolve;

pub use init::init_command;
pub use replay::{replay_command, ReplayOptions};
pub use resolve::resolve_command;
