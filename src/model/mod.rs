pub mod descriptor;
pub mod mutation;
pub mod page;
pub mod query;

pub use descriptor::*;
pub use mutation::*;
pub use page::*;
pub use query::*;
