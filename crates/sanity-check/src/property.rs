//! Property-based testing harness for contract-checked functions.
//!
//! Callers provide seed argument lists (interesting/edge cases) and an
//! iteration count. The harness runs the seeds, then generates randomized
//! arguments from each parameter's [`ValueKind`] with a deterministic PRNG
//! and runs those too.
//!
//! Inputs that fail a precondition are rejected, not failures: the caller
//! was told not to pass them. Postcondition violations are failures.
//!
//! Reproducibility: given the same `random_seed`, the same inputs are
//! generated and the same results are produced.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use sanity_core::Value;

use crate::checked::CheckedFn;
use crate::contracts::ContractViolation;
use crate::error::CallError;
use crate::signature::{Args, Bindings, Signature, ValueKind};
use crate::trace::TraceEntry;

/// Configuration for a property test run.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Hand-picked argument lists, run before any random ones.
    pub seeds: Vec<Args>,
    /// Number of randomized argument lists to run.
    pub iterations: u32,
    /// PRNG seed; the same seed always generates the same inputs.
    pub random_seed: u64,
}

/// Result of a property test run.
#[derive(Debug, Clone)]
pub struct PropertyTestResult {
    /// Seeds plus random iterations.
    pub total_run: u32,
    pub passed: u32,
    /// Calls stopped by a precondition.
    pub rejected: u32,
    /// Calls that failed to bind, hit a contract that could not be
    /// evaluated, or whose body returned an error.
    pub errored: u32,
    pub failures: Vec<PropertyTestFailure>,
    pub random_seed: u64,
}

/// A postcondition violation together with the inputs that caused it.
#[derive(Debug, Clone)]
pub struct PropertyTestFailure {
    pub args: Args,
    pub violation: ContractViolation,
    pub trace: Vec<TraceEntry>,
}

/// Generates a random value of the given kind.
///
/// Boundary values (0, 1, -1, MIN, MAX, the empty string/list) are weighted
/// into the mix to increase edge-case coverage.
pub fn generate_random_value(kind: ValueKind, rng: &mut ChaCha8Rng) -> Value {
    match kind {
        ValueKind::Unit => Value::Unit,

        ValueKind::Bool => Value::Bool(rng.gen_bool(0.5)),

        ValueKind::Int => {
            // ~30% chance of boundary value
            if rng.gen_ratio(3, 10) {
                let boundaries: &[i64] = &[0, 1, -1, i64::MIN, i64::MAX];
                Value::Int(boundaries[rng.gen_range(0..boundaries.len())])
            } else {
                Value::Int(rng.gen())
            }
        }

        ValueKind::Float => {
            if rng.gen_ratio(3, 10) {
                let boundaries: &[f64] = &[0.0, -0.0, 1.0, -1.0];
                Value::Float(boundaries[rng.gen_range(0..boundaries.len())])
            } else {
                Value::Float(rng.gen_range(-1e12f64..1e12f64))
            }
        }

        ValueKind::Str => {
            let len = if rng.gen_ratio(1, 5) { 0 } else { rng.gen_range(1..12) };
            Value::Str(
                (0..len)
                    .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
                    .collect(),
            )
        }

        ValueKind::IntList => {
            let len = if rng.gen_ratio(1, 5) { 0 } else { rng.gen_range(1..8) };
            Value::List(
                (0..len)
                    .map(|_| Value::Int(rng.gen_range(-1000..1000)))
                    .collect(),
            )
        }

        ValueKind::Any => {
            let kinds = [
                ValueKind::Bool,
                ValueKind::Int,
                ValueKind::Float,
                ValueKind::Str,
            ];
            let kind = kinds[rng.gen_range(0..kinds.len())];
            generate_random_value(kind, rng)
        }
    }
}

/// Generates one positional argument per parameter.
pub fn generate_random_args(signature: &Signature, rng: &mut ChaCha8Rng) -> Args {
    Args::positional(
        signature
            .params
            .iter()
            .map(|p| generate_random_value(p.kind, rng)),
    )
}

/// Runs property tests against a checked function.
///
/// Seeds run first, then random variations. Each call is traced, so a
/// failure carries every contract evaluated on the way to it.
pub fn run_property_tests<F, E>(function: &CheckedFn<F>, config: PropertyTestConfig) -> PropertyTestResult
where
    F: Fn(&Bindings) -> Result<Value, E>,
{
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
    let mut result = PropertyTestResult {
        total_run: 0,
        passed: 0,
        rejected: 0,
        errored: 0,
        failures: Vec::new(),
        random_seed: config.random_seed,
    };

    for args in config.seeds {
        run_single_test(function, args, &mut result);
    }

    for _ in 0..config.iterations {
        let args = generate_random_args(function.signature(), &mut rng);
        run_single_test(function, args, &mut result);
    }

    debug!(
        function = %function.signature().name,
        total = result.total_run,
        passed = result.passed,
        rejected = result.rejected,
        failures = result.failures.len(),
        "property run finished"
    );
    result
}

fn run_single_test<F, E>(function: &CheckedFn<F>, args: Args, result: &mut PropertyTestResult)
where
    F: Fn(&Bindings) -> Result<Value, E>,
{
    result.total_run += 1;
    let (outcome, trace) = function.call_traced(&args);
    match outcome {
        Ok(_) => result.passed += 1,
        Err(CallError::Precondition(_)) => result.rejected += 1,
        Err(CallError::Postcondition(violation)) => result.failures.push(PropertyTestFailure {
            args,
            violation,
            trace,
        }),
        Err(CallError::Bind(_) | CallError::Contract(_) | CallError::Body(_)) => {
            result.errored += 1
        }
    }
}
