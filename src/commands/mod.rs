// ABOUTME: Command module aggregator for the shipline CLI.
// ABOUTME: Re-exports run, plan, render and status command handlers.

mod plan;
mod render;
mod run;
mod runtime_connection;
mod status;

pub use plan::plan;
pub use render::render;
pub use run::run;
pub use status::status;
