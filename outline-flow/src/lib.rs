pub mod annotations;
pub mod error;
pub mod model;
pub mod normalize;
pub mod rendered;
pub mod resolve;
pub mod session;
pub mod source;
pub mod text;
pub mod view;

// Re-export commonly used types
pub use annotations::{AnnotationIndex, AnnotationMap};
pub use error::{OutlineError, Result};
pub use model::{OutlineItem, OutlineNode, collapse_root_chain};
pub use normalize::{PLACEHOLDER_TITLE, flatten, flatten_or_placeholder};
pub use rendered::{RenderedNode, assign_ids, parse};
pub use resolve::QuestionResolver;
pub use session::{ActiveDocument, OutlineSession, SelectOutcome};
#[cfg(feature = "http")]
pub use source::HttpOutlineSource;
pub use source::{InMemoryOutlineSource, OutlineSource};
pub use view::MindmapView;
