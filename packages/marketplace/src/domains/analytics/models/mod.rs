pub mod rollups;

pub use rollups::*;
