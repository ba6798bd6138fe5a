//! Reference-graph resolution and field projection.
//!
//! Voyager responses are normalized: the requested entities are named by URN
//! under `data`, and every entity (requested or not) lives once in a side
//! `included` list. Keys prefixed with `*` point at other entities by URN.
//!
//! This module turns such a response into plain, fully dereferenced records:
//!
//! - [`path`]: dotted/indexed lookups that never fail loudly
//! - [`projection`]: declarative `{output -> path}` record shaping
//! - [`resolver`]: pointer resolution against a URN table
//! - [`extract`]: root selection + resolution + projection
//! - [`experience`]: the experience section's component-tree walk
//!
//! Everything here is pure and synchronous.

pub mod experience;
pub mod extract;
pub mod image;
pub mod path;
pub mod projection;
pub mod resolver;
pub mod urn;

pub use experience::{extract_experiences, Experience, ExperienceError};
pub use extract::{extract, GraphResponse};
pub use path::{get, FieldPath};
pub use projection::{project, project_one, ProjectionMap, Record};
pub use resolver::{resolve_references, ResolutionTable};
