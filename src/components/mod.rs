pub mod hooks;
pub mod toc_shell;

pub use toc_shell::*;
