pub mod common;
pub mod payload;
pub mod request;

pub use common::*;
pub use payload::*;
pub use request::*;
