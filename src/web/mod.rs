//! Page asset handling: path resolution, content types and `$` templating.

pub mod assets;
pub mod template;

pub use assets::Asset;
pub use template::{PlaceholderTable, TemplateSource};
