//! Core math modules.

pub mod stable;
pub mod gamma;
pub mod normal;
pub mod interval;
pub mod variance;
