pub mod analyzer;
pub mod palette;
pub mod traits;
