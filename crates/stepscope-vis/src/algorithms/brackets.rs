//! Bracket matching with an explicit stack.
//!
//! Each payload carries a snapshot of the stack (`stack`, the open
//! characters) and the positions still open (`open`). Characters other than
//! brackets are skipped.

use std::convert::Infallible;

use stepscope_trace::{build_trace, EntityId, Payload, Recorder, StepKind, Trace, Value};

/// A bracket matching problem instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brackets {
    pub input: String,
}

impl Brackets {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn trace(&self) -> stepscope_trace::Result<Trace> {
        build_trace(self, record)
    }

    /// One entity per character.
    pub fn entities(&self) -> Vec<EntityId> {
        (0..self.input.chars().count()).map(EntityId::Index).collect()
    }
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_closer(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

fn snapshot(stack: &[(usize, char)]) -> Payload {
    let chars: Vec<char> = stack.iter().map(|&(_, c)| c).collect();
    Payload::new()
        .with("stack", chars)
        .with("open", Value::ids(stack.iter().map(|&(i, _)| EntityId::Index(i))))
}

pub fn record(rec: &mut Recorder, problem: &Brackets) -> Result<(), Infallible> {
    let mut stack: Vec<(usize, char)> = Vec::new();

    rec.record(
        StepKind::Start,
        snapshot(&stack).with("input", &problem.input),
        "Scan left to right with an empty stack",
    );

    for (i, c) in problem.input.chars().enumerate() {
        let here = EntityId::Index(i);

        if closer_for(c).is_some() {
            stack.push((i, c));
            rec.record(
                StepKind::Push,
                snapshot(&stack).with("active", here),
                format!("Push '{}'", c),
            );
        } else if is_closer(c) {
            match stack.pop() {
                Some((j, open)) if closer_for(open) == Some(c) => {
                    let pair = Value::ids([EntityId::Index(j), here]);
                    rec.record(
                        StepKind::Match,
                        snapshot(&stack)
                            .with("comparing", pair.clone())
                            .with("success", pair),
                        format!("'{}' closes '{}'", c, open),
                    );
                }
                Some((j, open)) => {
                    let pair = Value::ids([EntityId::Index(j), here]);
                    rec.record(
                        StepKind::Mismatch,
                        snapshot(&stack).with("error", pair.clone()),
                        format!("'{}' cannot close '{}'", c, open),
                    );
                    rec.record(
                        StepKind::Done,
                        snapshot(&stack).with("error", pair).with("valid", false),
                        "Unbalanced",
                    );
                    return Ok(());
                }
                None => {
                    rec.record(
                        StepKind::Mismatch,
                        snapshot(&stack).with("error", here.clone()),
                        format!("'{}' has nothing to close", c),
                    );
                    rec.record(
                        StepKind::Done,
                        snapshot(&stack).with("error", here).with("valid", false),
                        "Unbalanced",
                    );
                    return Ok(());
                }
            }
        } else {
            rec.record(
                StepKind::Visit,
                snapshot(&stack).with("visiting", here),
                format!("Skip '{}'", c),
            );
        }
    }

    if stack.is_empty() {
        rec.record(
            StepKind::Done,
            snapshot(&stack).with("valid", true),
            "Every bracket is closed",
        );
    } else {
        let unclosed = Value::ids(stack.iter().map(|&(i, _)| EntityId::Index(i)));
        rec.record(
            StepKind::Done,
            snapshot(&stack).with("error", unclosed).with("valid", false),
            format!("{} bracket(s) left open", stack.len()),
        );
    }
    Ok(())
}
