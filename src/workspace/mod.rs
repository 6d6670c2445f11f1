pub mod path_resolver;

pub use path_resolver::{validate_tools, ItemLayout, PathResolver};
