use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use symptom_advisor::commands::analyze::{self, AnalyzeArgs};
use symptom_advisor::commands::config::{self, ConfigArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  symptom-advisor analyze --symptoms fever --duration \"2 days\" --info \"no meds\"\n  symptom-advisor analyze --interactive --image rash.jpg\n  symptom-advisor config check --profile default\n  symptom-advisor completion bash > ~/.local/share/bash-completion/completions/symptom-advisor";

const ANALYZE_HELP_EXAMPLES: &str = "Examples:\n  symptom-advisor analyze --symptoms fever --duration \"2 days\" --info \"no meds\"\n  symptom-advisor analyze --symptoms rash --severity 3 --duration \"1 week\" --info \"new soap\" --image rash.jpg\n  symptom-advisor analyze --symptoms cough --duration \"3 days\" --info smoker --speak advice.mp3\n  symptom-advisor analyze --symptoms cough --duration \"3 days\" --info smoker --dry-run --json";

#[derive(Debug, Parser)]
#[command(
    name = "symptom-advisor",
    about = "Health advice from a symptom form, powered by a chat-completion API",
    after_help = format!("{}\n\n{ROOT_HELP_EXAMPLES}", analyze::DISCLAIMER)
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(
        about = "Analyze symptoms and print health advice",
        after_help = format!("{}\n\n{ANALYZE_HELP_EXAMPLES}", analyze::DISCLAIMER)
    )]
    Analyze(AnalyzeArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let name = "symptom-advisor";
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, name, &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, name, &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => analyze::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(err.exit_code());
    }
}
