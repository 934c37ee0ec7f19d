//! Stepscope Visualization
//!
//! Turns recorded traces into something a renderer can draw.
//!
//! # Architecture
//!
//! - **Visual states**: [`resolve_visual_state`] maps a step and an entity to
//!   a single [`VisualState`] from the conventional payload fields
//! - **Reference algorithms**: instrumented path sum, binary search and
//!   bracket matching, selected through [`Problem`]
//! - **Scenes**: a traced problem with its tree layout, resolved one
//!   [`Frame`] at a time
//!
//! # Usage
//!
//! ```
//! use stepscope_vis::{resolve_visual_state, Problem, Scene, VisualState};
//! use stepscope_trace::EntityId;
//!
//! let problem = Problem::parse("path-sum", "[1, 2, 3]", Some("4")).unwrap();
//! let scene = Scene::build(&problem).unwrap();
//!
//! let last = scene.trace().last();
//! assert_eq!(resolve_visual_state(last, &EntityId::Node(2)), VisualState::Success);
//! ```

pub mod algorithms;
mod error;
pub mod input;
mod scene;
mod visual;

pub use algorithms::Problem;
pub use error::{Error, Result};
pub use input::InputError;
pub use scene::{Frame, Scene};
pub use visual::{resolve_all, resolve_visual_state, FieldResolver, Resolver, VisualState};
