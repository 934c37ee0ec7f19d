//! Binary search over a sorted array.
//!
//! The search window is half-open, `[low, high)`. Indices outside it are
//! reported as `dimmed`, the probed index as `active` and `comparing`.

use std::convert::Infallible;

use stepscope_trace::{build_trace, EntityId, Payload, Recorder, StepKind, Trace, Value};

/// A binary search problem instance. `array` must be sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySearch {
    pub array: Vec<i64>,
    pub target: i64,
}

impl BinarySearch {
    pub fn new(array: Vec<i64>, target: i64) -> Self {
        Self { array, target }
    }

    pub fn trace(&self) -> stepscope_trace::Result<Trace> {
        build_trace(self, record)
    }

    /// One entity per array slot.
    pub fn entities(&self) -> Vec<EntityId> {
        (0..self.array.len()).map(EntityId::Index).collect()
    }
}

fn outside(len: usize, low: usize, high: usize) -> Value {
    Value::ids((0..low).chain(high..len).map(EntityId::Index))
}

fn window(problem: &BinarySearch, low: usize, high: usize) -> Payload {
    Payload::new()
        .with("array", &problem.array)
        .with("target", problem.target)
        .with("low", low)
        .with("high", high)
        .with("dimmed", outside(problem.array.len(), low, high))
}

pub fn record(rec: &mut Recorder, problem: &BinarySearch) -> Result<(), Infallible> {
    let array = &problem.array;
    let target = problem.target;
    let (mut low, mut high) = (0, array.len());

    rec.record(
        StepKind::Start,
        window(problem, low, high),
        format!("Search {} values for {}", array.len(), target),
    );

    while low < high {
        let mid = low + (high - low) / 2;
        let probe = EntityId::Index(mid);
        rec.record(
            StepKind::Compare,
            window(problem, low, high)
                .with("mid", mid)
                .with("active", probe.clone())
                .with("comparing", probe.clone()),
            format!("Compare array[{}] = {} with {}", mid, array[mid], target),
        );

        if array[mid] == target {
            rec.record(
                StepKind::Found,
                window(problem, low, high)
                    .with("mid", mid)
                    .with("index", mid)
                    .with("found", true)
                    .with("success", probe),
                format!("Found {} at index {}", target, mid),
            );
            return Ok(());
        }

        let description = if array[mid] < target {
            low = mid + 1;
            format!("{} < {}, keep the right half", array[mid], target)
        } else {
            high = mid;
            format!("{} > {}, keep the left half", array[mid], target)
        };
        rec.record(StepKind::Update, window(problem, low, high), description);
    }

    rec.record(
        StepKind::NotFound,
        window(problem, low, high).with("found", false),
        format!("{} is not in the array", target),
    );
    Ok(())
}
