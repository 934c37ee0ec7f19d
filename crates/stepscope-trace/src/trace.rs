//! The finalized, immutable step sequence.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::step::Step;

/// The full recorded sequence of steps for one algorithm run on one input.
///
/// A trace always holds at least two steps, opens with a start step and closes
/// with a terminal one. It has no mutators; re-running with new input means
/// building a new trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Step>", into = "Vec<Step>")]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true for a finalized trace.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the terminal step.
    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn first(&self) -> &Step {
        &self.steps[0]
    }

    pub fn last(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// blake3 hash of the canonical JSON encoding, hex encoded.
    ///
    /// Two runs of a deterministic algorithm on the same input produce the
    /// same fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.steps)?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }
}

/// Check that a step sequence has the shape of a finalized trace.
pub(crate) fn validate_shape(steps: &[Step]) -> Result<()> {
    if steps.len() < 2 {
        return Err(Error::InvalidShape(format!(
            "a trace needs at least 2 steps, got {}",
            steps.len()
        )));
    }
    if !steps[0].kind().is_start() {
        return Err(Error::InvalidShape(format!(
            "first step must be a start step, got {}",
            steps[0].kind()
        )));
    }
    let last = steps.len() - 1;
    if !steps[last].kind().is_terminal() {
        return Err(Error::InvalidShape(format!(
            "last step must be terminal, got {}",
            steps[last].kind()
        )));
    }
    for (index, step) in steps.iter().enumerate().take(last).skip(1) {
        if step.kind().is_start() {
            return Err(Error::MisplacedStart { index });
        }
        if step.kind().is_terminal() {
            return Err(Error::InvalidShape(format!(
                "terminal step {} at index {} before the end",
                step.kind(),
                index
            )));
        }
    }
    Ok(())
}

impl TryFrom<Vec<Step>> for Trace {
    type Error = Error;

    fn try_from(steps: Vec<Step>) -> Result<Self> {
        validate_shape(&steps)?;
        Ok(Self { steps })
    }
}

impl From<Trace> for Vec<Step> {
    fn from(trace: Trace) -> Self {
        trace.steps
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;
    use crate::value::Payload;

    fn step(kind: StepKind) -> Step {
        Step::new(kind, Payload::new(), kind.as_str())
    }

    #[test]
    fn accepts_minimal_shape() {
        let trace = Trace::try_from(vec![step(StepKind::Start), step(StepKind::Done)]).unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.last_index(), 1);
        assert_eq!(trace.first().kind(), StepKind::Start);
        assert_eq!(trace.last().kind(), StepKind::Done);
    }

    #[test]
    fn rejects_short_or_misframed_sequences() {
        assert!(Trace::try_from(Vec::<Step>::new()).is_err());
        assert!(Trace::try_from(vec![step(StepKind::Start)]).is_err());
        assert!(Trace::try_from(vec![step(StepKind::Visit), step(StepKind::Finish)]).is_err());
        assert!(Trace::try_from(vec![step(StepKind::Start), step(StepKind::Visit)]).is_err());
    }

    #[test]
    fn rejects_interior_frame_steps() {
        let result = Trace::try_from(vec![
            step(StepKind::Start),
            step(StepKind::Start),
            step(StepKind::Finish),
        ]);
        assert!(matches!(result, Err(Error::MisplacedStart { index: 1 })));

        let result = Trace::try_from(vec![
            step(StepKind::Start),
            step(StepKind::Found),
            step(StepKind::Finish),
        ]);
        assert!(matches!(result, Err(Error::InvalidShape(_))));
    }

    #[test]
    fn deserialization_validates_shape() {
        let trace = Trace::try_from(vec![
            step(StepKind::Start),
            step(StepKind::Visit),
            step(StepKind::Finish),
        ])
        .unwrap();

        let json = serde_json::to_string(&trace).unwrap();
        let parsed: Trace = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trace);

        let bad = serde_json::to_string(&vec![step(StepKind::Visit)]).unwrap();
        assert!(serde_json::from_str::<Trace>(&bad).is_err());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = Trace::try_from(vec![step(StepKind::Start), step(StepKind::Finish)]).unwrap();
        let b = a.clone();
        let c = Trace::try_from(vec![step(StepKind::Start), step(StepKind::Done)]).unwrap();

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }
}
