// Rewriters that apply report recommendations to source files.
pub mod interaction;
pub mod pending;
pub mod plugin_updater;
pub mod props_updater;
pub mod recommendations;
pub mod wrapper_updater;

pub use interaction::UpdateInteraction;
pub use pending::PendingWrites;
pub use plugin_updater::{PluginUpdate, PluginUpdater};
pub use props_updater::PropsUpdater;
pub use wrapper_updater::{WrapperUpdater, check_gradle_update};
