mod cli;

use clap::Parser;
use cli::opts::Opts;
use log::error;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    let opts = Opts::parse();

    if let Err(err) = cli::run(opts).await {
        error!("{:#}", err);
        eprintln!("{}", cli::error_envelope(&err));
        std::process::exit(1);
    }
}
