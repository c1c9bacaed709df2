pub mod cli;
pub mod error;
pub mod sink;
pub mod source;

pub use cli::{Cli, RunStatus, run};
pub use error::Error;
pub use sink::{Color, Format, RenderConfig, append_results};
pub use source::{read_credentials, split_lines};
