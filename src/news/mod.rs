pub mod data;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod types;
pub mod utils;
pub mod viz;

// Re-export commonly used types and functions for convenience
pub use data::*;
pub use pipeline::*;
pub use report::*;
pub use stats::*;
pub use types::*;
pub use utils::*;
pub use viz::*;
