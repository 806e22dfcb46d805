pub mod inventory;
pub mod project_scanner;
pub mod update;
pub mod version_checker;

pub use inventory::InventoryCollector;
pub use project_scanner::{ProjectInfo, ProjectScannerAgent};
pub use update::{
    PendingWrites, PluginUpdate, PluginUpdater, PropsUpdater, UpdateInteraction, WrapperUpdater,
    check_gradle_update,
};
pub use version_checker::VersionChecker;
