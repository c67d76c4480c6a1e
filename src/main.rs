use clap::Parser;
use tracing_subscriber::EnvFilter;

use lipid_quantifier::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("lipid_quantifier=debug,info")
    } else {
        EnvFilter::new("lipid_quantifier=warn")
    };

    // Reports go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Convert(args) => {
            cli::convert::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Quantify(args) => {
            cli::quantify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Layout(args) => {
            cli::layout::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
