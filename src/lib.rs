pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::toml_config::FilterConfig;
pub use crate::core::query::Query;
pub use crate::core::{resolve, Construct, ConversionHook, Domain, Slice, TsDict, TsList};
pub use crate::domain::object::{Conversion, TsObject};
pub use crate::domain::ts::Ts;
pub use crate::domain::tsdiff::TsDiff;
pub use crate::utils::error::{ErrorKind, Result, TsError};
