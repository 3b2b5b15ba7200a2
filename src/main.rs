use std::process::ExitCode;

use category_eval::cli::{self, Cli, Command, Status};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => cli::run::run(args).await,
        Command::List(args) => cli::list::run(args).await,
    };

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            Status::from_error(&e).into()
        }
    }
}
