//! Core data types: literals, three-literal clauses, and instances.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur while building or loading an instance.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// A clause did not have exactly three literals.
    #[error("clause {clause} has {len} literals, expected 3")]
    Arity { clause: usize, len: usize },

    /// The DIMACS `p cnf <vars> <clauses>` header is missing or malformed.
    #[error("malformed DIMACS header: {0}")]
    Header(String),

    /// A token in the clause section is not an integer literal.
    #[error("line {line}: invalid literal '{token}'")]
    InvalidLiteral { line: usize, token: String },

    /// A literal references a variable above the declared count.
    #[error("line {line}: variable {variable} exceeds declared count {declared}")]
    VariableOutOfRange {
        line: usize,
        variable: u32,
        declared: u32,
    },

    /// The number of clauses read disagrees with the header.
    #[error("header declares {declared} clauses, found {found}")]
    ClauseCount { declared: usize, found: usize },

    /// The input ended inside a clause (no terminating `0`).
    #[error("unterminated clause at end of input")]
    Unterminated,

    /// Random generation needs three distinct variables per clause.
    #[error("cannot draw 3 distinct variables from {0}")]
    TooFewVariables(u32),

    /// IO error while reading an instance file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A variable or its negation, e.g. `x3` or `¬x3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    variable: u32,
    negated: bool,
}

impl Literal {
    pub fn new(variable: u32, negated: bool) -> Self {
        Self { variable, negated }
    }

    /// The positive literal `x<variable>`.
    pub fn pos(variable: u32) -> Self {
        Self::new(variable, false)
    }

    /// The negative literal `¬x<variable>`.
    pub fn neg(variable: u32) -> Self {
        Self::new(variable, true)
    }

    pub fn variable(&self) -> u32 {
        self.variable
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("¬")?;
        }
        write!(f, "x{}", self.variable)
    }
}

/// A clause of exactly three literals.
///
/// The arity is part of the type, so a `Clause` can never hold more or fewer
/// literals. Duplicate or complementary literals are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause([Literal; 3]);

impl Clause {
    pub fn new(literals: [Literal; 3]) -> Self {
        Self(literals)
    }

    pub fn literals(&self) -> &[Literal; 3] {
        &self.0
    }
}

impl TryFrom<&[Literal]> for Clause {
    type Error = InstanceError;

    fn try_from(literals: &[Literal]) -> Result<Self, Self::Error> {
        let array: [Literal; 3] = literals.try_into().map_err(|_| InstanceError::Arity {
            clause: 0,
            len: literals.len(),
        })?;
        Ok(Self(array))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = &self.0;
        write!(f, "{a} ∧ {b} ∧ {c}")
    }
}

/// An ordered conjunction of clauses.
///
/// The variable set is derived from the clauses on demand and never stored,
/// so it cannot drift out of sync with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    clauses: Vec<Clause>,
}

impl Instance {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// The fixed four-clause, six-variable instance used by the driver.
    pub fn example() -> Self {
        use Literal as L;
        Self::new(vec![
            Clause::new([L::pos(0), L::neg(2), L::pos(4)]),
            Clause::new([L::neg(0), L::pos(1), L::pos(3)]),
            Clause::new([L::pos(2), L::neg(1), L::neg(5)]),
            Clause::new([L::neg(4), L::neg(3), L::pos(5)]),
        ])
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Distinct variable indices across all clauses, sorted ascending.
    pub fn variables(&self) -> Vec<u32> {
        self.clauses
            .iter()
            .flat_map(|c| c.literals().iter().map(Literal::variable))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn num_variables(&self) -> usize {
        self.variables().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl FromIterator<Clause> for Instance {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
