//! Random 3-SAT instance generation.

use rand::seq::index;
use rand::Rng;

use crate::types::{Clause, Instance, InstanceError, Literal};

/// Generate a uniformly random 3-SAT instance.
///
/// Each clause draws three distinct variables from `0..num_variables` and
/// negates each with probability 1/2. Not every variable is guaranteed to
/// appear, so the rendered variable count may be lower than `num_variables`.
pub fn random_instance<R: Rng + ?Sized>(
    num_variables: u32,
    num_clauses: usize,
    rng: &mut R,
) -> Result<Instance, InstanceError> {
    if num_clauses > 0 && num_variables < 3 {
        return Err(InstanceError::TooFewVariables(num_variables));
    }

    let instance: Instance = (0..num_clauses)
        .map(|_| {
            let picks = index::sample(&mut *rng, num_variables as usize, 3);
            let mut lits = [Literal::pos(0); 3];
            for (slot, var) in lits.iter_mut().zip(picks.iter()) {
                *slot = Literal::new(var as u32, rng.gen_bool(0.5));
            }
            Clause::new(lits)
        })
        .collect();

    tracing::debug!(
        num_variables,
        num_clauses,
        distinct = instance.num_variables(),
        "Generated random 3-SAT instance"
    );
    Ok(instance)
}
