//! DIMACS CNF loading restricted to 3-SAT.
//!
//! Accepts the usual layout: `c` comment lines, a single `p cnf <vars> <clauses>`
//! header, then whitespace-separated literals with each clause terminated by `0`.
//! Clauses may span lines. Literal `k` maps to variable `|k|`, negated when `k < 0`.

use std::path::Path;

use crate::types::{Clause, Instance, InstanceError, Literal};

#[derive(Debug, Clone, Copy)]
struct Header {
    variables: u32,
    clauses: usize,
}

impl Header {
    fn parse(line: &str) -> Result<Self, InstanceError> {
        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        match fields.as_slice() {
            ["p", "cnf", vars, clauses] => Ok(Self {
                variables: vars
                    .parse()
                    .map_err(|_| InstanceError::Header(line.to_string()))?,
                clauses: clauses
                    .parse()
                    .map_err(|_| InstanceError::Header(line.to_string()))?,
            }),
            _ => Err(InstanceError::Header(line.to_string())),
        }
    }
}

/// Parse a DIMACS CNF document where every clause has exactly three literals.
pub fn parse_dimacs(input: &str) -> Result<Instance, InstanceError> {
    let mut header: Option<Header> = None;
    let mut clauses: Vec<Clause> = Vec::new();
    let mut current: Vec<Literal> = Vec::with_capacity(3);

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        // SATLIB uf* files end with a `%` line followed by a stray `0`.
        if line.starts_with('%') {
            break;
        }
        if line.starts_with('p') {
            if header.is_some() {
                return Err(InstanceError::Header(format!("duplicate header: {line}")));
            }
            header = Some(Header::parse(line)?);
            continue;
        }
        let Some(h) = header else {
            return Err(InstanceError::Header("clause data before header".into()));
        };

        for token in line.split_ascii_whitespace() {
            let value: i64 = token.parse().map_err(|_| InstanceError::InvalidLiteral {
                line: line_no,
                token: token.to_string(),
            })?;
            if value == 0 {
                let clause = Clause::try_from(current.as_slice()).map_err(|_| {
                    InstanceError::Arity {
                        clause: clauses.len(),
                        len: current.len(),
                    }
                })?;
                clauses.push(clause);
                current.clear();
                continue;
            }
            let variable = u32::try_from(value.unsigned_abs()).map_err(|_| {
                InstanceError::InvalidLiteral {
                    line: line_no,
                    token: token.to_string(),
                }
            })?;
            if variable > h.variables {
                return Err(InstanceError::VariableOutOfRange {
                    line: line_no,
                    variable,
                    declared: h.variables,
                });
            }
            current.push(Literal::new(variable, value < 0));
        }
    }

    let header = header.ok_or_else(|| InstanceError::Header("missing header".into()))?;
    if !current.is_empty() {
        return Err(InstanceError::Unterminated);
    }
    if clauses.len() != header.clauses {
        return Err(InstanceError::ClauseCount {
            declared: header.clauses,
            found: clauses.len(),
        });
    }

    tracing::debug!(
        variables = header.variables,
        clauses = clauses.len(),
        "Parsed DIMACS instance"
    );
    Ok(Instance::new(clauses))
}

/// Read and parse a DIMACS file.
pub fn load_dimacs(path: &Path) -> Result<Instance, InstanceError> {
    let contents = std::fs::read_to_string(path)?;
    let instance = parse_dimacs(&contents)?;
    tracing::info!(
        path = %path.display(),
        clauses = instance.num_clauses(),
        "Loaded DIMACS instance"
    );
    Ok(instance)
}
