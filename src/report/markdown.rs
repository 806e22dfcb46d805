use crate::error::Result;
use crate::report::store::REPORT_DIR;
use crate::report::{DependencyUpdateRec, GradleUpdateReport, UpdateReport};
use std::fmt::Write;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MARKDOWN_REPORT: &str = "report.md";

fn markdown_path(root: &Path) -> PathBuf {
    root.join(REPORT_DIR).join(MARKDOWN_REPORT)
}

/// Render every module's updates as one Markdown document.
pub fn render_markdown(reports: &[UpdateReport], gradle: Option<&GradleUpdateReport>) -> String {
    let mut out = String::from("# Dependency updates\n");

    if let Some(gradle) = gradle {
        let _ = writeln!(
            out,
            "\nGradle: `{}` -> `{}`",
            gradle.gradle.current_version, gradle.gradle.latest_version
        );
    }

    let pending: Vec<&UpdateReport> = reports.iter().filter(|r| !r.is_empty()).collect();
    if pending.is_empty() {
        out.push_str("\nAll dependencies are up to date.\n");
        return out;
    }

    for report in pending {
        let _ = writeln!(out, "\n## Project `{}`", report.project);
        write_section(&mut out, "Dependencies", &report.dependency_updates);
        write_section(&mut out, "Plugins", &report.plugin_updates);
    }
    out
}

fn write_section(out: &mut String, title: &str, updates: &[DependencyUpdateRec]) {
    if updates.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n### {title}\n");
    out.push_str("| Dependency | Current | Latest | Type |\n");
    out.push_str("|---|---|---|---|\n");
    for rec in updates {
        let kind = rec
            .upgrade_type
            .map(|k| k.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "| `{}` | {} | {} | {} |",
            rec.identifier(),
            rec.current_version,
            rec.latest_version,
            kind
        );
    }
}

pub fn write_markdown_summary(
    root: &Path,
    reports: &[UpdateReport],
    gradle: Option<&GradleUpdateReport>,
) -> Result<PathBuf> {
    let path = markdown_path(root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, render_markdown(reports, gradle))?;
    Ok(path)
}

/// Remove the Markdown summary. Returns whether a file was deleted.
pub fn clear_markdown_report(root: &Path) -> Result<bool> {
    match fs::remove_file(markdown_path(root)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
