use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gradle-versions",
    about = "Find newer dependency, plugin and Gradle versions and rewrite them in place",
    version,
    author
)]
pub struct Cli {
    /// Path to the Gradle project root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the commands that rewrite files.
#[derive(Args, Debug, Clone, Copy)]
pub struct UpdateArgs {
    /// Confirm each change before applying it
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the changes without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query repositories and write an upgrade report for every module
    Check {
        /// Include unstable versions (alpha, beta, RC)
        #[arg(long)]
        include_unstable: bool,

        /// Maximum number of concurrent repository requests
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: Option<u16>,
    },

    /// Compare the wrapper's Gradle version with the latest release
    CheckGradle,

    /// Apply the reported dependency upgrades to versions.props
    UpdateProps(UpdateArgs),

    /// Apply the reported plugin upgrades to build scripts
    UpdatePlugins(UpdateArgs),

    /// Point the Gradle wrapper at the reported distribution
    UpdateWrapper(UpdateArgs),

    /// Run check and check-gradle, then apply every update
    Update {
        #[command(flatten)]
        args: UpdateArgs,

        /// Include unstable versions (alpha, beta, RC)
        #[arg(long)]
        include_unstable: bool,
    },

    /// Write a Markdown summary of all module reports
    Report,

    /// Remove the Markdown summary
    ClearReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_update_flags() {
        let cli = Cli::try_parse_from(["gradle-versions", "update-props", "-i", "--dry-run"]).unwrap();
        match cli.command {
            Commands::UpdateProps(args) => {
                assert!(args.interactive);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_concurrency() {
        assert!(Cli::try_parse_from(["gradle-versions", "check", "--concurrency", "0"]).is_err());
    }
}
