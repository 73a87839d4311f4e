pub mod engine;
pub mod filter;
pub mod mutation;
pub mod pagination;
pub mod registry;
pub mod sort;

pub use engine::*;
pub use filter::{build_filters, parse_value};
pub use mutation::{resolve_outcome, validate_mutation, ValidatedMutation};
pub use pagination::{envelope, LinkTemplate, PageWindow};
pub use registry::ResourceRegistry;
pub use sort::resolve_sort;
