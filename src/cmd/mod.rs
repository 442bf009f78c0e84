//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], or [`health`].
//! Each handler lives in its own submodule.

pub mod health;
pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::RedirectorError;

pub async fn dispatch(cli: Cli) -> Result<(), RedirectorError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("REDIRECTOR_GIT_SHORT");
    println!(
        "\n  redirector v{version} ({commit}) \u{2014} path-to-URL redirect server\n\n  \
         No command provided. To get started:\n\n    \
         redirector init                        Generate ./redirects.yaml\n    \
         redirector run                         Serve it (auto-detects ./redirects.yaml)\n    \
         redirector run --json-file links.json  Serve a JSON document\n    \
         redirector --help                      See all commands and options\n"
    );
}
