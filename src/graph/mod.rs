mod model;

pub use model::{Edge, GraphModel, GroupTag, Node, RelatedEntry};
