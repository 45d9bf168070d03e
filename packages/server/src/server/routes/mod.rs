// HTTP routes
pub mod error;
pub mod extract;
pub mod health;
pub mod reset;

pub use error::*;
pub use extract::*;
pub use health::*;
pub use reset::*;
