//! Reading and in-place rewriting of `versions.props` recommendation files.

pub mod fuzzy;
pub mod versions_props;

pub use fuzzy::FuzzyPatternResolver;
pub use versions_props::{UpdatedLine, VERSIONS_PROPS, VersionsProps};
