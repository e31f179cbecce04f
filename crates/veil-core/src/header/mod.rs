//! On-disk container header.

pub mod container;
pub mod data;
pub mod format;
pub mod key;

pub use container::ContainerHeader;
pub use data::DataHeader;
pub use format::*;
pub use key::KeyHeader;
