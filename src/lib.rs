pub mod assign;
pub mod common;
pub mod encode;
pub mod error;
mod helpers;
pub mod identifier;
pub mod load;
pub mod palette;
pub mod pipeline;
pub mod quantize;
pub mod raster;
pub mod writer;

pub use error::{AssetError, Result};
