use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug};
use tracing::info;

/// A binary integer operation that a [`Context`] can delegate to.
///
/// Overflow wraps around, so results are the same in debug and release builds.
pub trait Operation: Debug {
    fn apply(&self, a: i32, b: i32) -> i32;

    /// Infix symbol used when printing `a <symbol> b = result`.
    fn symbol(&self) -> char;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Addition;

#[derive(Debug, Clone, Copy, Default)]
pub struct Subtraction;

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiplication;

impl Operation for Addition {
    fn apply(&self, a: i32, b: i32) -> i32 {
        a.wrapping_add(b)
    }

    fn symbol(&self) -> char {
        '+'
    }
}

impl Operation for Subtraction {
    fn apply(&self, a: i32, b: i32) -> i32 {
        a.wrapping_sub(b)
    }

    fn symbol(&self) -> char {
        '-'
    }
}

impl Operation for Multiplication {
    fn apply(&self, a: i32, b: i32) -> i32 {
        a.wrapping_mul(b)
    }

    fn symbol(&self) -> char {
        '*'
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationId {
    Addition,
    Subtraction,
    Multiplication,
}

impl OperationId {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationId::Addition => "addition",
            OperationId::Subtraction => "subtraction",
            OperationId::Multiplication => "multiplication",
        }
    }

    pub const fn all() -> &'static [OperationId] {
        &[
            OperationId::Addition,
            OperationId::Subtraction,
            OperationId::Multiplication,
        ]
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OperationId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "addition" | "add" | "+" => Ok(OperationId::Addition),
            "subtraction" | "sub" | "-" => Ok(OperationId::Subtraction),
            "multiplication" | "mul" | "*" => Ok(OperationId::Multiplication),
            _ => Err(anyhow::anyhow!(
                "Unknown operation '{value}'. Supported operations: addition, subtraction, multiplication."
            )),
        }
    }
}

/// Construct the built-in operation named by `id`.
pub fn operation_from_id(id: OperationId) -> Box<dyn Operation> {
    match id {
        OperationId::Addition => Box::new(Addition),
        OperationId::Subtraction => Box::new(Subtraction),
        OperationId::Multiplication => Box::new(Multiplication),
    }
}

/// Holds the currently selected operation and runs it on request.
#[derive(Debug)]
pub struct Context {
    strategy: Box<dyn Operation>,
}

impl Context {
    pub fn new(strategy: Box<dyn Operation>) -> Self {
        Self { strategy }
    }

    /// Swap the active operation. Only calls made after this one see it.
    pub fn set_strategy(&mut self, strategy: Box<dyn Operation>) {
        info!(from = ?self.strategy, to = ?strategy, "switching strategy");
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> &dyn Operation {
        self.strategy.as_ref()
    }

    pub fn execute(&self, a: i32, b: i32) -> i32 {
        self.strategy.apply(a, b)
    }
}
