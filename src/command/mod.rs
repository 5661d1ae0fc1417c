pub mod arg;
pub mod pattern;
pub mod queue;
pub mod registry;

pub use registry::{Command, CommandDescription, CommandRegistry, ResolvedArgs, ResolvedValue};
