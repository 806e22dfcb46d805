use crate::error::{Result, VersionsError};
use colored::Colorize;
use std::fmt;
use std::io::{self, BufRead, Write};

/// What an interactive prompt is about to change
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpdateCategory {
    /// A `versions.props` entry
    Pin,
    Plugin,
    Gradle,
}

impl fmt::Display for UpdateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdateCategory::Pin => "versions.props",
            UpdateCategory::Plugin => "Plugin",
            UpdateCategory::Gradle => "Gradle",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Apply,
    Skip,
    ApplyAll,
    Quit,
}

fn parse_decision(input: &str) -> Option<Decision> {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Some(Decision::Apply),
        "n" | "no" => Some(Decision::Skip),
        "a" | "all" => Some(Decision::ApplyAll),
        "q" | "quit" => Some(Decision::Quit),
        _ => None,
    }
}

/// Asks the user to confirm each rewrite when running with `--interactive`.
pub struct UpdateInteraction {
    enabled: bool,
    apply_all: bool,
}

impl UpdateInteraction {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            apply_all: false,
        }
    }

    /// Returns `Ok(false)` to skip, `Err(UserCancelled)` when the user quits.
    pub fn confirm(
        &mut self,
        category: UpdateCategory,
        name: &str,
        old: &str,
        new: &str,
    ) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }

        let category_label = format!("[{}]", category);
        println!(
            "\n{} {} {} {} to {}",
            category_label.cyan().bold(),
            name.white().bold(),
            "from".dimmed(),
            old.red(),
            new.green().bold()
        );

        if self.apply_all {
            println!("{}", "Auto-applying (previously selected 'all').".dimmed());
            return Ok(true);
        }

        let stdin = io::stdin();
        loop {
            print!("{}", "Apply this update? [Y/n/a/q]: ".bold());
            io::stdout().flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                // stdin closed
                return Err(VersionsError::UserCancelled);
            }

            match parse_decision(&input) {
                Some(Decision::Apply) => return Ok(true),
                Some(Decision::Skip) => {
                    println!("{}", "Skipping this update.".dimmed());
                    return Ok(false);
                }
                Some(Decision::ApplyAll) => {
                    println!(
                        "{}",
                        "Applying this and all remaining updates.".green().bold()
                    );
                    self.apply_all = true;
                    return Ok(true);
                }
                Some(Decision::Quit) => {
                    println!("{}", "Stopping update process at user request.".yellow());
                    return Err(VersionsError::UserCancelled);
                }
                None => {
                    println!(
                        "{}",
                        "Please answer with y(es), n(o), a(ll), or q(quit).".red()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers() {
        assert_eq!(parse_decision("\n"), Some(Decision::Apply));
        assert_eq!(parse_decision("Yes\n"), Some(Decision::Apply));
        assert_eq!(parse_decision("n"), Some(Decision::Skip));
        assert_eq!(parse_decision(" a "), Some(Decision::ApplyAll));
        assert_eq!(parse_decision("Q"), Some(Decision::Quit));
        assert_eq!(parse_decision("maybe"), None);
    }

    #[test]
    fn disabled_interaction_always_applies() {
        let mut interaction = UpdateInteraction::new(false);
        assert!(interaction
            .confirm(UpdateCategory::Plugin, "com.foo.bar", "0.1.0", "0.2.0")
            .unwrap());
    }
}
