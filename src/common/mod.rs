pub mod manifest;
pub mod package;
pub mod paths;
