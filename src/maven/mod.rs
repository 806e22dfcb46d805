pub mod policy;
pub mod repository;
pub mod version;

pub use policy::VersionPolicy;
pub use repository::MavenRepository;
pub use version::{UpgradeKind, Version, VersionComparator};
