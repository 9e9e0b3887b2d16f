use anyhow::Context;
use colored::Colorize;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = wordvault::run().context("wordvault") {
        eprintln!("{} {:#}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}
