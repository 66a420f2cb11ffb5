// Library root for the courtside binary: upstream fetching, region output,
// HTML rendering, the refresh task runner and the CLI.

pub mod app;
pub mod cli;
pub mod fetch;
pub mod refresh;
pub mod region;
pub mod render;
pub mod tasks;
