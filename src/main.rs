use std::process::ExitCode;

use crate::cli::run;

pub mod cli;
pub mod client;
mod config;
pub mod domain;
pub mod http;
pub mod present;
pub mod visualize;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}
