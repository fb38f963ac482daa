//! The element model: typed element records, their property bags and the
//! ordered scene that owns them.
//!
//! - `kind`: the element type enum and its schema registry
//! - `element`: the element record and id type
//! - `props`: read-only accessor over a property bag with fallbacks
//! - `lenient`: forgiving deserializers for hand-edited or legacy records
//! - `scene`: the ordered element collection (index = z-order)

mod element;
mod kind;
pub(crate) mod lenient;
mod props;
mod scene;

pub use element::{Element, ElementId, MIN_SIZE, Range};
pub use kind::ElementKind;
pub use props::{Props, coerce_number, is_truthy, value_to_text};
pub use scene::Scene;
