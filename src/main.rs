use clap::Parser;
use linktag::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = Cli::parse();
    if !cli::finish(cli::run(args).await) {
        std::process::exit(1);
    }
    Ok(())
}
