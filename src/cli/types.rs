use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "projdash")]
#[command(about = "Terminal dashboard for the projects API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Projdash Contributors")]
pub struct Cli {
    /// Defaults to `dashboard` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(long, short, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "API base URL (overrides config and environment)")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Bearer token (overrides config and environment)")]
    pub token: Option<String>,

    #[arg(long, short, global = true, help = "Verbose output")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Interactive project dashboard")]
    Dashboard {
        #[arg(long, help = "Initial search term")]
        search: Option<String>,

        #[arg(long, help = "Initial filter (all, active, completed, recent)")]
        filter: Option<String>,
    },

    #[command(about = "Fetch and print projects")]
    List {
        #[arg(long, help = "Search term")]
        search: Option<String>,

        #[arg(long, help = "Filter (all, active, completed, recent)")]
        filter: Option<String>,

        #[arg(long, help = "Print raw JSON")]
        json: bool,
    },

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    #[command(about = "Generate shell completions", hide = true)]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Set configuration value")]
    Set {
        #[arg(help = "Configuration key")]
        key: String,

        #[arg(help = "Configuration value")]
        value: String,
    },

    #[command(about = "Get configuration value")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },

    #[command(about = "Reset configuration to defaults")]
    Reset,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

impl Cli {
    pub fn generate_completions(shell: Shell) {
        use clap_complete::{generate, shells};
        use std::io;

        let mut cmd = Self::command();
        match shell {
            Shell::Bash => generate(shells::Bash, &mut cmd, "projdash", &mut io::stdout()),
            Shell::Zsh => generate(shells::Zsh, &mut cmd, "projdash", &mut io::stdout()),
            Shell::Fish => generate(shells::Fish, &mut cmd, "projdash", &mut io::stdout()),
            Shell::PowerShell => {
                generate(shells::PowerShell, &mut cmd, "projdash", &mut io::stdout())
            }
        }
    }

    /// Commands that talk to the projects API and so need a usable config.
    pub fn uses_api(&self) -> bool {
        matches!(
            self.command,
            None | Some(Commands::Dashboard { .. }) | Some(Commands::List { .. })
        )
    }

    /// True when the terminal is about to be taken over by the dashboard.
    pub fn runs_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Dashboard { .. }))
    }
}
