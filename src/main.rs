use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;

use yamlset::config::Config;
use yamlset::driver::{self, RunOptions, RunOutcome};
use yamlset::logging::init_logging;
use yamlset::remote::{CommitAuthor, FileLocation, GitHubStore};

/// yamlset - Replace values in a YAML file on a GitHub branch
#[derive(Parser, Debug)]
#[command(name = "yamlset")]
#[command(version)]
#[command(
    about = "Replace values at dotted key paths in a YAML file on a GitHub branch and commit the result",
    long_about = None
)]
struct Cli {
    /// The owner of the repository to edit
    #[arg(long)]
    owner: String,

    /// The repository to edit
    #[arg(long)]
    repo: String,

    /// The branch to edit
    #[arg(long)]
    branch: String,

    /// The file to edit, relative to the repository root
    #[arg(long)]
    file: String,

    /// The location in the YAML file to replace, such as spec.image.tag. Repeatable
    #[arg(long = "location", required = true)]
    locations: Vec<String>,

    /// The content to replace the text at the provided locations with
    #[arg(long)]
    replacement: String,

    /// Print the edited file instead of committing it
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print a unified diff instead of the whole file
    #[arg(long)]
    diff: bool,

    /// The GitHub username of the commit author
    #[arg(long)]
    author_username: Option<String>,

    /// The commit message (default: "Update <file>")
    #[arg(long = "message")]
    message: Option<String>,

    /// Token to use to access GitHub
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Seconds to wait for GitHub (default: 30)
    #[arg(long)]
    timeout: Option<u64>,

    /// Warn about locations that are not found in the file
    #[arg(long)]
    warn_missing: bool,

    /// Config file to use instead of ~/.config/yamlset/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Exit status for help and version output.
const EXIT_HELP: u8 = 2;
/// Exit status for unusable flags.
const EXIT_USAGE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let status = flag_error_status(&err);
            if status == EXIT_HELP {
                let _ = write!(io::stderr(), "{}", err);
            } else {
                eprintln!("flag parsing: {}", err);
            }
            return ExitCode::from(status);
        }
    };

    init_logging();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    let options = match run_options(&cli, &config) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("flag parsing: {:#}", err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(cli.token.as_deref(), &config, &options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Exit status for a failed `Cli` parse: help and version output are not
/// usage errors.
fn flag_error_status(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_HELP,
        _ => EXIT_USAGE,
    }
}

/// Reads the config file and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!(?config, "loaded config");

    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(username) = &cli.author_username {
        config.author_username = Some(username.clone());
    }
    if let Some(message) = &cli.message {
        config.commit_message = Some(message.clone());
    }
    config.warn_missing |= cli.warn_missing;
    config.show_diff |= cli.diff;
    Ok(config)
}

fn run_options(cli: &Cli, config: &Config) -> Result<RunOptions> {
    let username = match (&config.author_username, cli.dry_run) {
        (Some(username), _) => username.clone(),
        (None, true) => String::new(),
        (None, false) => anyhow::bail!("--author-username is required unless --dry-run is set"),
    };

    Ok(RunOptions {
        location: FileLocation::new(&cli.owner, &cli.repo, &cli.branch, &cli.file),
        locations: cli.locations.clone(),
        replacement: cli.replacement.clone(),
        dry_run: cli.dry_run,
        show_diff: config.show_diff,
        author: CommitAuthor::from_username(&username),
        message: config.commit_message_for(&cli.file),
        warn_missing: config.warn_missing,
    })
}

async fn run(token: Option<&str>, config: &Config, options: &RunOptions) -> Result<()> {
    let store = match token {
        Some(token) => GitHubStore::new(token),
        None => GitHubStore::anonymous(),
    }
    .context("Failed to create GitHub client")?;

    let outcome = tokio::time::timeout(config.timeout(), driver::run(&store, options))
        .await
        .with_context(|| {
            format!(
                "timed out after {}s waiting for GitHub",
                config.timeout_secs
            )
        })??;

    match outcome {
        RunOutcome::DryRun {
            commit_sha,
            content,
            diff,
        } => {
            eprintln!("Using content from commit {}", commit_sha);
            let mut stdout = io::stdout().lock();
            match (options.show_diff, diff) {
                (true, Some(diff)) => write!(stdout, "{}", diff),
                (true, None) => {
                    eprintln!("No changes");
                    Ok(())
                }
                (false, _) => write!(stdout, "{}", content),
            }
            .context("Failed to write output")?;
            stdout.flush().context("Failed to write output")?;
        }
        RunOutcome::Unchanged { commit_sha } => {
            eprintln!("No changes to {} at commit {}", options.location.path, commit_sha);
        }
        RunOutcome::Committed { commit_sha } => {
            println!("{}", commit_sha);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REQUIRED: &[&str] = &[
        "yamlset",
        "--owner",
        "acme",
        "--repo",
        "deploy",
        "--branch",
        "main",
        "--file",
        "app.yaml",
        "--location",
        "spec.image.tag",
        "--replacement",
        "v2",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::try_parse_from(REQUIRED.iter().chain(extra)).unwrap()
    }

    fn config_file(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_help_and_version_exit_with_two() {
        let help = Cli::try_parse_from(["yamlset", "--help"]).unwrap_err();
        assert_eq!(flag_error_status(&help), EXIT_HELP);
        let version = Cli::try_parse_from(["yamlset", "--version"]).unwrap_err();
        assert_eq!(flag_error_status(&version), EXIT_HELP);
    }

    #[test]
    fn test_bad_flags_exit_with_three() {
        let missing = Cli::try_parse_from(["yamlset", "--owner", "acme"]).unwrap_err();
        assert_eq!(flag_error_status(&missing), EXIT_USAGE);

        let unknown = Cli::try_parse_from(REQUIRED.iter().chain(&["--bogus"])).unwrap_err();
        assert_eq!(flag_error_status(&unknown), EXIT_USAGE);

        let timeout = Cli::try_parse_from(REQUIRED.iter().chain(&["--timeout", "soon"])).unwrap_err();
        assert_eq!(flag_error_status(&timeout), EXIT_USAGE);
    }

    #[test]
    fn test_repeated_locations() {
        let cli = parse(&["--location", "sidecar.image.tag"]);
        assert_eq!(cli.locations, vec!["spec.image.tag", "sidecar.image.tag"]);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = config_file(
            &dir,
            "timeout_secs = 10\nauthor_username = \"bot\"\ncommit_message = \"Bump\"\nwarn_missing = true\n",
        );
        let cli = parse(&[
            "--config",
            &path,
            "--timeout",
            "5",
            "--author-username",
            "octocat",
            "--diff",
        ]);

        let config = load_config(&cli).unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.author_username.as_deref(), Some("octocat"));
        assert_eq!(config.commit_message.as_deref(), Some("Bump"));
        assert!(config.warn_missing);
        assert!(config.show_diff);
    }

    #[test]
    fn test_config_file_used_without_flags() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "timeout_secs = 10\nauthor_username = \"bot\"\n");
        let cli = parse(&["--config", &path]);

        let config = load_config(&cli).unwrap();
        let options = run_options(&cli, &config).unwrap();

        assert_eq!(config.timeout_secs, 10);
        assert_eq!(options.author.name, "bot");
        assert_eq!(options.message, "Update app.yaml");
        assert!(!options.warn_missing);
        assert_eq!(options.location.path, "app.yaml");
        assert_eq!(options.locations, vec!["spec.image.tag"]);
    }

    #[test]
    fn test_unreadable_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "timeout_secs = \"soon\"\n");
        let cli = parse(&["--config", &path]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_commit_requires_author() {
        let cli = parse(&[]);
        let err = run_options(&cli, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("--author-username"));

        let cli = parse(&["--dry-run"]);
        let options = run_options(&cli, &Config::default()).unwrap();
        assert!(options.dry_run);
    }
}
