use clap::{Args, Subcommand};

use crate::config;
use crate::error::AdvisorError;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    #[command(about = "Parse the config file and validate profile values")]
    Check {
        #[arg(long, help = "Only validate this profile")]
        profile: Option<String>,
    },
    #[command(about = "Print where the config file is looked up")]
    Path,
}

pub fn run(args: ConfigArgs) -> Result<(), AdvisorError> {
    match args.command {
        ConfigSubcommand::Check { profile } => {
            let path = config::validate_config(profile.as_deref())?;
            println!("config OK: {}", path.display());
        }
        ConfigSubcommand::Path => {
            println!("{}", config::config_path()?.display());
        }
    }
    Ok(())
}
