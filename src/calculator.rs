// 🧮 Calculation Engine
// Pure arithmetic over two operands. No I/O, no state.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// OPERATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Lowercase name, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    /// Apply the operation. Division checks the divisor before dividing.
    ///
    /// Results that overflow to infinity are rejected: JSON has no way to
    /// carry them back to the client.
    pub fn apply(&self, a: f64, b: f64) -> Result<f64, ValidationError> {
        let result = match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                // -0.0 == 0.0 holds, so both zeros are rejected
                if b == 0.0 {
                    return Err(ValidationError::DivisionByZero);
                }
                a / b
            }
        };

        if !result.is_finite() {
            return Err(ValidationError::NonFiniteResult);
        }
        Ok(result)
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            _ => Err(ValidationError::InvalidOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ENGINE ENTRY POINT
// ============================================================================

/// Parse `operation` (case-insensitive) and apply it to the operands.
pub fn compute(operation: &str, a: f64, b: f64) -> Result<f64, ValidationError> {
    operation.parse::<Operation>()?.apply(a, b)
}
