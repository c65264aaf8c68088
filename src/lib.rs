pub mod common;
pub mod ui;
pub mod webinstall;
