use crate::agents::{
    InventoryCollector, PendingWrites, PluginUpdate, PluginUpdater, ProjectInfo,
    ProjectScannerAgent, PropsUpdater, UpdateInteraction, VersionChecker, WrapperUpdater,
    check_gradle_update,
};
use crate::cli::UpdateArgs;
use crate::config::VersionsConfig;
use crate::error::{Result, VersionsError};
use crate::gradle::{GradleConfigParser, GradleReleaseClient};
use crate::props::UpdatedLine;
use crate::report::{
    DependencyUpdateRec, GradleUpdateRec, GradleUpdateReport, Reports, UpdateReport,
    clear_markdown_report, write_markdown_summary,
};
use crate::repository::RepositoryFactory;
use colored::Colorize;
use std::path::Path;

/// Options of the `check` command that override `gradle-versions.toml`.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    pub include_unstable: bool,
    pub concurrency: Option<usize>,
    /// Draw a progress bar while querying repositories
    pub show_progress: bool,
}

/// Execute the check workflow: write a `report.yml` for every module
pub async fn execute_check<P: AsRef<Path>>(project_path: P, options: CheckOptions) -> Result<()> {
    println!("{}", "Checking for available updates...".cyan().bold());

    println!("\n{}", "1. Validating project structure...".yellow());
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    println!("{}", "✓ Project structure is valid".green());

    let reports = run_check(&project, options, 2).await?;
    print_available_updates(&reports);
    Ok(())
}

async fn run_check(
    project: &ProjectInfo,
    options: CheckOptions,
    first_step: usize,
) -> Result<Vec<UpdateReport>> {
    let mut step = first_step;
    let mut next_step = |title: &str| {
        println!("\n{}", format!("{step}. {title}").yellow());
        step += 1;
    };

    next_step("Loading configuration...");
    let mut config = VersionsConfig::load(&project.project_path)?;
    if options.include_unstable {
        config.stable_only = false;
    }
    if let Some(concurrency) = options.concurrency {
        config.concurrency = concurrency;
    }
    let policy = config.policy()?;
    let version_channel = if config.stable_only { "stable" } else { "all" };
    println!("   Considering {} versions", version_channel.bright_cyan());

    next_step("Reading Gradle repository configuration...");
    let gradle_config = GradleConfigParser::new(&project.project_path)
        .with_extra_repositories(config.repositories.clone())
        .parse()?;
    println!(
        "   Found {} repositories:",
        gradle_config.repositories.len()
    );
    for repo in &gradle_config.repositories {
        println!("   • {} ({})", repo.name.bright_cyan(), repo.url.dimmed());
    }

    next_step("Collecting declarations...");
    let inventories =
        InventoryCollector::new(project, &config.exclude_configurations).collect()?;
    let declared: usize = inventories.iter().map(|i| i.declarations.len()).sum();
    println!(
        "   Found {} declarations in {} module(s)",
        declared,
        inventories.len()
    );

    next_step("Querying repositories...");
    let libraries =
        RepositoryFactory::create_maven(gradle_config.repositories.clone(), config.concurrency)?;
    let plugins =
        RepositoryFactory::create_plugin_portal(gradle_config.repositories, config.concurrency)?;
    let checker = VersionChecker::new(libraries, plugins, policy, config.concurrency)
        .with_progress(options.show_progress);
    let reports = checker.check(&inventories).await;

    for (inventory, report) in inventories.iter().zip(&reports) {
        Reports::write_update_report(&inventory.module.dir, report)?;
    }
    println!("{}", "✓ Reports written".green());

    Ok(reports)
}

/// Execute the check-gradle workflow: write the root `gradle-report.yml`
pub async fn execute_check_gradle<P: AsRef<Path>>(project_path: P) -> Result<()> {
    println!("{}", "Checking for a newer Gradle release...".cyan().bold());

    println!("\n{}", "1. Validating project structure...".yellow());
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    println!("{}", "✓ Project structure is valid".green());

    let report = run_check_gradle(&project, 2).await?;
    print_gradle_update(report.as_ref());
    Ok(())
}

async fn run_check_gradle(
    project: &ProjectInfo,
    step: usize,
) -> Result<Option<GradleUpdateReport>> {
    let channel = VersionsConfig::load(&project.project_path)?.channel()?;
    println!(
        "\n{}",
        format!("{step}. Querying Gradle services ({channel} channel)...").yellow()
    );
    let client = GradleReleaseClient::new()?;
    check_gradle_update(project, &client, channel).await
}

fn print_gradle_update(report: Option<&GradleUpdateReport>) {
    match report {
        Some(report) => {
            println!(
                "\n  • {} {} → {}",
                "Gradle".white().bold(),
                report.gradle.current_version.red(),
                report.gradle.latest_version.green().bold()
            );
            println!("\n{}", "To apply this update, run:".dimmed());
            println!("  {}", "gradle-versions update-wrapper".cyan());
        }
        None => println!("\n{}", "✨ Gradle is up to date!".green().bold()),
    }
}

/// Execute the update-props workflow
pub fn execute_update_props<P: AsRef<Path>>(project_path: P, args: UpdateArgs) -> Result<()> {
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    let mut interaction = UpdateInteraction::new(args.interactive);
    let mut pending = PendingWrites::default();
    println!("{}", "Updating versions.props...".cyan().bold());

    let result = PropsUpdater::new(&project).apply(&mut interaction, &mut pending);
    if let Some(updated) = unless_cancelled(result)? {
        write_pending(pending, args.dry_run)?;
        print_props_updates(&updated, args.dry_run);
    }
    Ok(())
}

/// Execute the update-plugins workflow
pub fn execute_update_plugins<P: AsRef<Path>>(project_path: P, args: UpdateArgs) -> Result<()> {
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    let mut interaction = UpdateInteraction::new(args.interactive);
    let mut pending = PendingWrites::default();
    println!("{}", "Updating plugin versions...".cyan().bold());

    let result = PluginUpdater::new(&project).apply(&mut interaction, &mut pending);
    if let Some(updated) = unless_cancelled(result)? {
        write_pending(pending, args.dry_run)?;
        print_plugin_updates(&project, &updated, args.dry_run);
    }
    Ok(())
}

/// Execute the update-wrapper workflow
pub fn execute_update_wrapper<P: AsRef<Path>>(project_path: P, args: UpdateArgs) -> Result<()> {
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    let mut interaction = UpdateInteraction::new(args.interactive);
    let mut pending = PendingWrites::default();
    println!("{}", "Updating the Gradle wrapper...".cyan().bold());

    let result = WrapperUpdater::new(&project).apply(&mut interaction, &mut pending);
    if let Some(updated) = unless_cancelled(result)? {
        write_pending(pending, args.dry_run)?;
        print_wrapper_update(updated.as_ref(), args.dry_run);
    }
    Ok(())
}

/// Execute the full update workflow: check everything, then apply every update
pub async fn execute_update<P: AsRef<Path>>(
    project_path: P,
    args: UpdateArgs,
    options: CheckOptions,
) -> Result<()> {
    println!("{}", "Starting dependency update process...".cyan().bold());

    println!("\n{}", "1. Validating project structure...".yellow());
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    println!("{}", "✓ Project structure is valid".green());

    let reports = run_check(&project, options, 2).await?;
    run_check_gradle(&project, 6).await?;

    println!("\n{}", "7. Applying updates...".yellow());
    let mut interaction = UpdateInteraction::new(args.interactive);
    let mut pending = PendingWrites::default();
    let result = collect_updates(&project, &mut interaction, &mut pending);
    let Some(updates) = unless_cancelled(result)? else {
        return Ok(());
    };
    write_pending(pending, args.dry_run)?;

    match &updates.props {
        Some(updated) => print_props_updates(updated, args.dry_run),
        None => println!("{}", "   No versions.props found, skipping pinned versions".dimmed()),
    }
    print_plugin_updates(&project, &updates.plugins, args.dry_run);
    print_wrapper_update(updates.wrapper.as_ref(), args.dry_run);

    let total: usize = reports.iter().map(UpdateReport::total_updates).sum();
    if total == 0 {
        println!("\n{}", "No dependency updates were found".yellow());
    }
    println!(
        "\n{}",
        "✨ Update process completed successfully!".green().bold()
    );
    Ok(())
}

/// Everything one `update` session staged.
struct CollectedUpdates {
    /// `None` when the build has no `versions.props`
    props: Option<Vec<UpdatedLine>>,
    plugins: Vec<PluginUpdate>,
    wrapper: Option<GradleUpdateRec>,
}

fn collect_updates(
    project: &ProjectInfo,
    interaction: &mut UpdateInteraction,
    pending: &mut PendingWrites,
) -> Result<CollectedUpdates> {
    let props = match project.versions_props {
        Some(_) => Some(PropsUpdater::new(project).apply(interaction, pending)?),
        None => None,
    };
    let plugins = PluginUpdater::new(project).apply(interaction, pending)?;
    let wrapper = WrapperUpdater::new(project).apply(interaction, pending)?;
    Ok(CollectedUpdates {
        props,
        plugins,
        wrapper,
    })
}

/// Write the staged files unless this is a dry run.
fn write_pending(pending: PendingWrites, dry_run: bool) -> Result<()> {
    if dry_run || pending.is_empty() {
        return Ok(());
    }
    let written = pending.commit()?;
    println!(
        "{}",
        format!("✓ {} file(s) written", written.len()).green()
    );
    Ok(())
}

/// Execute the report workflow: render all module reports as Markdown
pub fn execute_report<P: AsRef<Path>>(project_path: P) -> Result<()> {
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    let reports = Reports::load_all(project.module_dirs())?;
    let gradle = Reports::load_gradle_report(&project.project_path)?;

    if reports.is_empty() && gradle.is_none() {
        println!("{}", "No reports found.".yellow());
        println!("\n{}", "To generate them, run:".dimmed());
        println!("  {}", "gradle-versions check".cyan());
        return Ok(());
    }

    let path = write_markdown_summary(&project.project_path, &reports, gradle.as_ref())?;
    println!(
        "{}",
        format!("✓ Summary written to {}", path.display()).green()
    );
    Ok(())
}

/// Execute the clear-report workflow
pub fn execute_clear_report<P: AsRef<Path>>(project_path: P) -> Result<()> {
    let project = ProjectScannerAgent::new(project_path.as_ref()).validate()?;
    if clear_markdown_report(&project.project_path)? {
        println!("{}", "✓ Markdown summary removed".green());
    } else {
        println!("{}", "No Markdown summary to remove".dimmed());
    }
    Ok(())
}

/// `Ok(None)` when the user quit an interactive session.
fn unless_cancelled<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(VersionsError::UserCancelled) => {
            println!("\n{}", "Update cancelled by user.".yellow());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn applied_label(dry_run: bool) -> &'static str {
    if dry_run { "Would update" } else { "Updated" }
}

fn print_available_updates(reports: &[UpdateReport]) {
    let total: usize = reports.iter().map(UpdateReport::total_updates).sum();
    if total == 0 {
        println!("\n{}", "✨ All dependencies are up to date!".green().bold());
        return;
    }

    println!("\n{}", "📦 Available Updates:".cyan().bold());
    println!("{}", format!("Found {total} update(s)").yellow());

    for report in reports.iter().filter(|r| !r.is_empty()) {
        println!("\n{} {}", "Project".cyan().bold(), report.project.white().bold());
        print_recs("Dependencies", &report.dependency_updates);
        print_recs("Plugins", &report.plugin_updates);
    }

    println!("\n{}", "To apply these updates, run:".dimmed());
    println!("  {}", "gradle-versions update-props".cyan());
    println!("  {}", "gradle-versions update-plugins".cyan());
}

fn print_recs(title: &str, recs: &[DependencyUpdateRec]) {
    if recs.is_empty() {
        return;
    }
    println!("  {}:", title.cyan());
    for rec in recs {
        let kind = rec
            .upgrade_type
            .map(|kind| format!(" ({kind})"))
            .unwrap_or_default();
        println!(
            "    • {} {} → {}{}",
            rec.identifier().white().bold(),
            rec.current_version.dimmed(),
            rec.latest_version.green().bold(),
            kind.dimmed()
        );
    }
}

fn print_props_updates(updated: &[UpdatedLine], dry_run: bool) {
    if updated.is_empty() {
        println!("{}", "✓ versions.props is up to date".green());
        return;
    }
    println!("\n{}:", applied_label(dry_run).cyan().bold());
    for line in updated {
        println!(
            "  • {} {} → {}",
            line.dependency.white().bold(),
            line.old_version.red(),
            line.new_version.green().bold()
        );
    }
}

fn print_plugin_updates(project: &ProjectInfo, updated: &[PluginUpdate], dry_run: bool) {
    if updated.is_empty() {
        println!("{}", "✓ Plugin versions are up to date".green());
        return;
    }
    println!("\n{}:", applied_label(dry_run).cyan().bold());
    for update in updated {
        let file = update
            .file
            .strip_prefix(&project.project_path)
            .unwrap_or(&update.file);
        println!(
            "  • {} {} → {} ({})",
            update.plugin_id.white().bold(),
            update.old_version.red(),
            update.new_version.green().bold(),
            file.display().to_string().dimmed()
        );
    }
}

fn print_wrapper_update(updated: Option<&GradleUpdateRec>, dry_run: bool) {
    match updated {
        Some(rec) => println!(
            "\n{}: {} {} → {}",
            applied_label(dry_run).cyan().bold(),
            "Gradle wrapper".white().bold(),
            rec.current_version.red(),
            rec.latest_version.green().bold()
        ),
        None => println!("{}", "✓ Gradle wrapper is up to date".green()),
    }
}
