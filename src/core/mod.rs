pub mod convert;
pub mod dict;
pub mod list;
pub mod query;
pub mod slice;

pub use crate::core::convert::{resolve, Construct, ConversionHook, Domain};
pub use crate::core::dict::TsDict;
pub use crate::core::list::TsList;
pub use crate::core::slice::Slice;
pub use crate::utils::error::Result;
