pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod graphql;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use entity::{EntityCounts, EntityKind};
pub use error::{EtlError, Result};
pub use pipeline::{run, FailurePolicy, RunReport};
pub use ui::{LogUi, Phase, SilentUi, Ui, UiApp};
