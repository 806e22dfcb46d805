use crate::agents::project_scanner::ProjectInfo;
use crate::error::Result;
use crate::gradle::build_script::parse_build_script;
use crate::gradle::{Declaration, DeclarationKind, Module};
use crate::props::VersionsProps;
use crate::utils::toml::TomlUtils;
use std::fs;
use tracing::debug;

/// Declarations found in one module.
#[derive(Debug, Clone)]
pub struct ModuleInventory {
    pub module: Module,
    pub declarations: Vec<Declaration>,
}

/// Collects the dependency and plugin declarations of every module of a build.
pub struct InventoryCollector<'a> {
    project: &'a ProjectInfo,
    excluded_configurations: &'a [String],
}

impl<'a> InventoryCollector<'a> {
    pub fn new(project: &'a ProjectInfo, excluded_configurations: &'a [String]) -> Self {
        Self {
            project,
            excluded_configurations,
        }
    }

    pub fn collect(&self) -> Result<Vec<ModuleInventory>> {
        let props = self
            .project
            .versions_props
            .as_deref()
            .map(VersionsProps::from_path)
            .transpose()?;

        let mut inventories = Vec::with_capacity(self.project.modules.len());
        for module in &self.project.modules {
            let mut declarations = match &module.build_file {
                Some(build_file) => {
                    let content = fs::read_to_string(build_file)?;
                    parse_build_script(build_file, &content, self.excluded_configurations)
                }
                None => Vec::new(),
            };

            if module.is_root() {
                if let Some(catalog) = &self.project.catalog_path {
                    let content = fs::read_to_string(catalog)?;
                    declarations.extend(TomlUtils::catalog_declarations(catalog, &content)?);
                }
            }

            let declarations = resolve_versionless(declarations, props.as_ref());
            debug!(module = %module.path, count = declarations.len(), "declarations collected");
            inventories.push(ModuleInventory {
                module: module.clone(),
                declarations,
            });
        }

        Ok(inventories)
    }
}

/// Fill in versionless declarations from `versions.props`; those it does not
/// govern are dropped since their current version is unknown.
fn resolve_versionless(
    declarations: Vec<Declaration>,
    props: Option<&VersionsProps>,
) -> Vec<Declaration> {
    declarations
        .into_iter()
        .filter_map(|mut declaration| {
            if declaration.version.is_some() {
                return Some(declaration);
            }
            let pinned = props
                .filter(|_| declaration.kind != DeclarationKind::Plugin)
                .and_then(|props| props.version_for(&declaration.coordinate.to_string()));
            match pinned {
                Some(version) => {
                    declaration.version = Some(version.to_string());
                    Some(declaration)
                }
                None => {
                    debug!(coordinate = %declaration.coordinate, "no version known, skipping");
                    None
                }
            }
        })
        .collect()
}
