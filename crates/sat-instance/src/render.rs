//! Prompt rendering for 3-SAT instances.
//!
//! Turns an [`Instance`] into the plain-text problem statement sent to the
//! model. Rendering is a pure function of the clauses: the same instance
//! always produces byte-identical text.

use crate::types::Instance;

/// Name of the problem class as it appears in the prompt (U+2011 hyphen).
const PROBLEM_NAME: &str = "3\u{2011}SAT";

/// Render the full problem statement for `instance`.
///
/// Layout:
/// ```text
/// Problem: 3‑SAT instance with 6 variables and 4 clauses
///
/// Variables: x0, x1, x2, x3, x4, x5
///
/// Clauses:
/// C0: x0 ∧ ¬x2 ∧ x4
/// ...
/// Given the 3‑SAT instance above, answer the following:
///
/// 1. Is the instance satisfiable? (Yes/No)
/// 2. If Yes, give a satisfying assignment in the form:
///    x0=0, x1=1, ...
///    (use 1 for true, 0 for false)
/// ```
pub fn render_prompt(instance: &Instance) -> String {
    let variables = instance.variables();
    let mut out = format!(
        "Problem: {PROBLEM_NAME} instance with {} variables and {} clauses\n\n",
        variables.len(),
        instance.num_clauses()
    );

    out.push_str("Variables: ");
    out.push_str(&join(variables.iter().map(|v| format!("x{v}"))));
    out.push_str("\n\n");

    out.push_str("Clauses:\n");
    for (i, clause) in instance.clauses().iter().enumerate() {
        out.push_str(&format!("C{i}: {clause}\n"));
    }

    out.push_str(&format_task(&variables));
    out
}

/// The fixed question block, with an assignment template over `variables`.
///
/// The template alternates 0/1 by position so the model sees both digits;
/// it is a format example, not a proposed assignment.
fn format_task(variables: &[u32]) -> String {
    let template = join(
        variables
            .iter()
            .enumerate()
            .map(|(i, v)| format!("x{v}={}", i & 1)),
    );
    format!(
        "Given the {PROBLEM_NAME} instance above, answer the following:\n\n\
         1. Is the instance satisfiable? (Yes/No)\n\
         2. If Yes, give a satisfying assignment in the form:\n   \
         {template}\n   \
         (use 1 for true, 0 for false)"
    )
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
