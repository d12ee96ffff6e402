pub mod dispatcher;
pub mod error;
pub mod host;
pub mod parser;
pub mod platform;
pub mod session;
pub mod surface;

pub use dispatcher::{CommandDispatcher, Outcome, TerminalEvent};
pub use error::{Result, TerminalError};
pub use host::TerminalHost;
pub use parser::CommandLine;
pub use platform::Platform;
pub use session::TerminalSession;
pub use surface::{ScrollbackSurface, TerminalSurface};
