//! Instrumented reference algorithms.
//!
//! Each algorithm records through a [`Recorder`](stepscope_trace::Recorder)
//! using the conventional payload fields read by
//! [`resolve_visual_state`](crate::resolve_visual_state).

pub mod binary_search;
pub mod brackets;
pub mod path_sum;

pub use binary_search::BinarySearch;
pub use brackets::Brackets;
pub use path_sum::{PathSum, SumOverflow};

use stepscope_layout::BinaryTree;
use stepscope_trace::{EntityId, Trace};

use crate::error::Result;
use crate::input::{parse_integer, parse_sorted_array, InputError};

/// A parsed problem instance, ready to be traced.
#[derive(Debug, Clone)]
pub enum Problem {
    PathSum(PathSum),
    BinarySearch(BinarySearch),
    Brackets(Brackets),
}

impl Problem {
    /// Problem names accepted by [`Problem::parse`].
    pub const NAMES: [&'static str; 3] = ["path-sum", "binary-search", "brackets"];

    /// Build a problem from its name, main input and optional argument.
    ///
    /// - `path-sum`: level-order tree, target (default 0)
    /// - `binary-search`: sorted JSON array, target (default 0)
    /// - `brackets`: the string to check
    pub fn parse(name: &str, input: &str, arg: Option<&str>) -> Result<Self> {
        let target = arg.map(|a| parse_integer("target", a)).transpose()?.unwrap_or(0);
        match name {
            "path-sum" => Ok(Problem::PathSum(PathSum::new(BinaryTree::parse(input)?, target))),
            "binary-search" => Ok(Problem::BinarySearch(BinarySearch::new(
                parse_sorted_array(input)?,
                target,
            ))),
            "brackets" => Ok(Problem::Brackets(Brackets::new(input))),
            other => Err(InputError::UnknownProblem(other.to_string()).into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Problem::PathSum(_) => "path-sum",
            Problem::BinarySearch(_) => "binary-search",
            Problem::Brackets(_) => "brackets",
        }
    }

    pub fn trace(&self) -> Result<Trace> {
        let trace = match self {
            Problem::PathSum(p) => p.trace(),
            Problem::BinarySearch(p) => p.trace(),
            Problem::Brackets(p) => p.trace(),
        }?;
        Ok(trace)
    }

    /// Entities a renderer should draw for this problem.
    pub fn entities(&self) -> Vec<EntityId> {
        match self {
            Problem::PathSum(p) => p.entities(),
            Problem::BinarySearch(p) => p.entities(),
            Problem::Brackets(p) => p.entities(),
        }
    }

    /// The input tree, for problems that have one.
    pub fn tree(&self) -> Option<&BinaryTree> {
        match self {
            Problem::PathSum(p) => Some(&p.tree),
            _ => None,
        }
    }
}
