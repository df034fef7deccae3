pub mod account;
pub mod analytics;
pub mod attack;
pub mod error;
pub mod extract;
pub mod filter;
pub mod hashfile;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod runner;
pub mod store;
pub mod wordlist;

pub mod prelude {
    pub use crate::attack::{AttackConfig, BaseArgs, HashMode};
    pub use crate::error::PipelineError;
    pub use crate::pipeline::{CrackOptions, Pipeline};
    pub use crate::runner::{Runner, SystemRunner};
}
