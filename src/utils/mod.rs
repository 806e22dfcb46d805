pub mod glob;
pub mod path_validator;
#[cfg(test)]
pub mod stub_server;
pub mod toml;
