#![doc = include_str!("../../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
mod error;
mod known_type;
mod package_url;
mod parse;
mod qualifier;

pub use error::*;
pub use known_type::*;
pub use package_url::*;
pub use qualifier::*;
