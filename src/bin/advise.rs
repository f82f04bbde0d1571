use std::process;

use clap::Parser;
use symptom_advisor::commands::analyze::{self, AnalyzeArgs};

#[derive(Debug, Parser)]
#[command(
    name = "advise",
    about = "Analyze symptoms and print health advice",
    after_help = analyze::DISCLAIMER,
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    analyze: AnalyzeArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = analyze::run(cli.analyze).await {
        eprintln!("{err}");
        process::exit(err.exit_code());
    }
}
