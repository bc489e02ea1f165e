use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell as CompShell};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use surge::commands::{check, run};

#[derive(Parser)]
#[command(name = "surge")]
#[command(version = "0.1.0")]
#[command(about = "Staged HTTP load testing from the command line")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load scenario
    Run {
        /// Scenario file to run
        scenario: PathBuf,
        /// Save a JSON run report
        #[arg(long = "output")]
        output: Option<PathBuf>,
        /// Progress report interval during the run
        #[arg(long = "report-interval", default_value = "2s")]
        report_interval: String,
        /// Fail the run when the overall check pass rate drops below this percentage
        #[arg(long = "min-pass-rate")]
        min_pass_rate: Option<f64>,
        /// Suppress the progress bar (for CI logs)
        #[arg(long = "quiet")]
        quiet: bool,
    },
    /// Validate a scenario file without running it
    Check {
        /// Scenario file to validate
        scenario: PathBuf,
    },
    /// Generate shell completions (internal)
    #[command(hide = true)]
    Completions {
        /// Shell: bash, zsh, fish
        shell: String,
    },
    /// Generate man page (internal)
    #[command(hide = true)]
    Man,
}

pub fn print_banner() {
    let banner = r#"
    ███████╗██╗   ██╗██████╗  ██████╗ ███████╗
    ██╔════╝██║   ██║██╔══██╗██╔════╝ ██╔════╝   surge v0.1.0
    ███████╗██║   ██║██████╔╝██║  ███╗█████╗     staged HTTP load testing
    ╚════██║██║   ██║██╔══██╗██║   ██║██╔══╝
    ███████║╚██████╔╝██║  ██║╚██████╔╝███████╗   https://github.com/surge-load/surge
    ╚══════╝ ╚═════╝ ╚═╝  ╚═╝ ╚═════╝ ╚══════╝
"#;

    if atty::is(atty::Stream::Stdout) {
        println!("{}", banner.cyan());
    } else {
        println!("surge v0.1.0 — staged HTTP load testing");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Print banner for user-facing commands only
    let quiet_run = matches!(cli.command, Commands::Run { quiet: true, .. });
    if !quiet_run
        && !matches!(cli.command, Commands::Completions { .. } | Commands::Man)
    {
        print_banner();
    }

    match cli.command {
        Commands::Run {
            scenario,
            output,
            report_interval,
            min_pass_rate,
            quiet,
        } => {
            run::handle_run(run::RunOptions {
                scenario,
                output,
                report_interval,
                min_pass_rate,
                quiet,
            })
            .await?;
        }
        Commands::Check { scenario } => {
            check::handle_check(scenario)?;
        }
        Commands::Completions { shell } => {
            // Generate completions to stdout for the requested shell
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            let sh = match shell.as_str() {
                "bash" => CompShell::Bash,
                "zsh" => CompShell::Zsh,
                "fish" => CompShell::Fish,
                "powershell" | "pwsh" => CompShell::PowerShell,
                "elvish" => CompShell::Elvish,
                other => {
                    eprintln!(
                        "Unsupported shell: {} (use bash|zsh|fish|powershell|elvish)",
                        other
                    );
                    std::process::exit(2);
                }
            };
            generate(sh, &mut cmd, name, &mut std::io::stdout());
        }
        Commands::Man => {
            // Generate a man page to stdout using clap_mangen
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            man.render(&mut std::io::stdout())?;
        }
    }

    Ok(())
}
