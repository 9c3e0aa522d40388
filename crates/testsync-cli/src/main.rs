mod commands;

use clap::{Parser, Subcommand};
use testsync_core::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "testsync",
    version,
    about = "Keep stored tests and a Git branch's test files in step",
    long_about = "testsync reconciles the tests stored for a group of teams with the test files\n\
        committed under a tracked directory of a Git branch.\n\n\
        Quick start:\n  \
        testsync init\n  \
        testsync team add --id web --name Web --integration main-repo\n  \
        testsync test add --team web --file login.test.js\n  \
        testsync sync --branch main --team web\n  \
        testsync prune --branch main --team web --test <id>"
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: .testsync/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Path to the project root (default: current directory)
    #[arg(short, long, global = true)]
    path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize testsync for a project
    ///
    /// Creates the SQLite database and writes a starter
    /// .testsync/config.toml if the project has none.
    ///
    /// Example: testsync init --path /path/to/project
    Init,
    /// Manage teams
    Team {
        #[command(subcommand)]
        command: TeamCommand,
    },
    /// Manage stored tests
    Test {
        #[command(subcommand)]
        command: TestCommand,
    },
    /// Create stored tests for branch files that have none
    ///
    /// Reads the branch's tracked directory, creates an empty test for every
    /// file not yet stored, and prints the tests that track the branch.
    ///
    /// Examples:
    ///   testsync sync --branch main --team web
    ///   testsync sync --branch feat/login --team web --with-team mobile --json
    Sync {
        /// Branch to reconcile against
        #[arg(long)]
        branch: String,

        /// Team that owns newly created tests
        #[arg(long)]
        team: String,

        /// Additional teams whose tests take part (repeatable)
        #[arg(long = "with-team")]
        with_teams: Vec<String>,

        /// Print the resulting tests as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the branch files of removed tests
    ///
    /// Examples:
    ///   testsync prune --branch main --team web --test 3f9a...
    ///   testsync prune --branch main --team web --name login.test.js
    Prune {
        /// Branch to delete from
        #[arg(long)]
        branch: String,

        /// Teams the removed tests belong to (repeatable)
        #[arg(long = "team", required = true)]
        teams: Vec<String>,

        /// Ids of the tests being removed (repeatable)
        #[arg(long = "test")]
        tests: Vec<String>,

        /// Names of the tests being removed (repeatable)
        #[arg(long = "name")]
        names: Vec<String>,
    },
}

#[derive(Subcommand)]
enum TeamCommand {
    /// Create or update a team
    Add {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// Git sync integration the team is bound to
        #[arg(long)]
        integration: Option<String>,
    },
    /// List all teams
    List,
}

#[derive(Subcommand)]
enum TestCommand {
    /// Store a test for a team
    Add {
        #[arg(long)]
        team: String,

        /// Test file path relative to the tracked directory
        #[arg(long = "file", id = "test_path")]
        test_path: String,

        /// Display name (default: the path)
        #[arg(long)]
        name: Option<String>,

        /// Mark the test as a guide
        #[arg(long)]
        guide: bool,

        /// Read the test's code from this file
        #[arg(long)]
        code_file: Option<String>,
    },
    /// List the stored tests of a team
    List {
        #[arg(long)]
        team: String,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = resolve_path(cli.path)?;
    let config_file = cli.config.as_deref().map(std::path::Path::new);
    let config = Config::load_with_file(Some(&path), config_file)?;

    // Set up tracing
    let filter = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run(&path, &config)?,
        Commands::Team { command } => match command {
            TeamCommand::Add {
                id,
                name,
                integration,
            } => commands::team::add(&config, &id, &name, integration)?,
            TeamCommand::List => commands::team::list(&config)?,
        },
        Commands::Test { command } => match command {
            TestCommand::Add {
                team,
                test_path,
                name,
                guide,
                code_file,
            } => commands::test::add(
                &config,
                &team,
                &test_path,
                name,
                guide,
                code_file.as_deref().map(std::path::Path::new),
            )?,
            TestCommand::List { team, json } => commands::test::list(&config, &team, json)?,
        },
        Commands::Sync {
            branch,
            team,
            with_teams,
            json,
        } => commands::sync::run(&config, &branch, &team, &with_teams, json)?,
        Commands::Prune {
            branch,
            teams,
            tests,
            names,
        } => commands::prune::run(&config, &branch, &teams, &tests, &names)?,
    }

    Ok(())
}

fn resolve_path(path: Option<String>) -> anyhow::Result<std::path::PathBuf> {
    match path {
        Some(p) => Ok(std::path::PathBuf::from(p)),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("testsync").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_keeps_project_root_and_test_file_apart() {
        let cli = parse(&[
            "-p", "app", "test", "add", "--team", "mobile", "--file", "login.test.js", "--guide",
        ]);
        assert_eq!(cli.path.as_deref(), Some("app"));
        match cli.command {
            Commands::Test {
                command:
                    TestCommand::Add {
                        team,
                        test_path,
                        name,
                        guide,
                        code_file,
                    },
            } => {
                assert_eq!(team, "mobile");
                assert_eq!(test_path, "login.test.js");
                assert_eq!(name, None);
                assert!(guide);
                assert_eq!(code_file, None);
            }
            _ => panic!("expected `test add`"),
        }
    }

    #[test]
    fn project_root_may_follow_the_subcommand() {
        let cli = parse(&[
            "test", "add", "--team", "web", "--file", "a.test.js", "--path", "app",
        ]);
        assert_eq!(cli.path.as_deref(), Some("app"));
    }

    #[test]
    fn sync_collects_repeated_extra_teams() {
        let cli = parse(&[
            "sync", "--branch", "main", "--team", "web", "--with-team", "mobile", "--with-team",
            "api", "--json",
        ]);
        match cli.command {
            Commands::Sync {
                branch,
                team,
                with_teams,
                json,
            } => {
                assert_eq!(branch, "main");
                assert_eq!(team, "web");
                assert_eq!(with_teams, vec!["mobile", "api"]);
                assert!(json);
            }
            _ => panic!("expected `sync`"),
        }
    }

    #[test]
    fn prune_accepts_repeated_teams_tests_and_names() {
        let cli = parse(&[
            "prune", "--branch", "main", "--team", "web", "--team", "mobile", "--test", "t1",
            "--test", "t2", "--name", "login.test.js",
        ]);
        match cli.command {
            Commands::Prune {
                branch,
                teams,
                tests,
                names,
            } => {
                assert_eq!(branch, "main");
                assert_eq!(teams, vec!["web", "mobile"]);
                assert_eq!(tests, vec!["t1", "t2"]);
                assert_eq!(names, vec!["login.test.js"]);
            }
            _ => panic!("expected `prune`"),
        }
    }

    #[test]
    fn prune_requires_a_team() {
        let err = Cli::try_parse_from(["testsync", "prune", "--branch", "main", "--test", "t1"]);
        assert!(err.is_err());
    }
}
