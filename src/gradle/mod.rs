pub mod build_script;
pub mod config_parser;
pub mod releases;
pub mod settings;
pub mod wrapper;

pub use build_script::{Declaration, DeclarationKind};
pub use config_parser::{GradleConfigParser, Repository};
pub use releases::{GradleReleaseClient, ReleaseChannel};
pub use settings::Module;
pub use wrapper::WrapperProperties;
