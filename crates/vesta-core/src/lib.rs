pub mod constants;
pub mod error;
pub mod types;
pub mod account;
pub mod queue;

pub use constants::*;
pub use error::VestaError;
pub use types::*;
pub use account::*;
pub use queue::*;
