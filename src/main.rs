use clap::Parser;

use todo_service::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = cli::load_and_merge_config(&cli)?;
    let log_handle = cli::init_logger_from_settings(&settings)?;

    cli::execute_command(&cli, settings, Some(log_handle)).await
}
