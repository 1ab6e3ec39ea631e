use anyhow::Result;
use clap::Parser;
use emuctl::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    emuctl::logging::init_with_level(args.log_level.raised(args.verbose));

    let errored = cli::run(args).await?;
    if errored {
        // The report already explains the failure.
        std::process::exit(1);
    }
    Ok(())
}
