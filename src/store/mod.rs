#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub use memory::*;
pub use postgres::*;
pub use traits::*;
