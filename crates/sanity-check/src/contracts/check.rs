//! Contract checking logic: resolve inputs, evaluate, produce violations.
//!
//! Called by [`CheckedFn`](crate::checked::CheckedFn) after binding
//! (preconditions) and after the body returns (postcondition).

use tracing::{debug, warn};

use sanity_core::{Expr, Input, Value};

use crate::contracts::{ContractKind, ContractViolation, Contracts};
use crate::error::ContractError;
use crate::signature::Bindings;
use crate::trace::TraceEntry;

/// Builds the value sequence an expression consumes for one call.
///
/// The default selector resolves to `subject`; a named selector resolves to
/// that parameter's bound value.
pub fn resolve_inputs(
    function: &str,
    expr: &Expr,
    subject: &Value,
    bindings: &Bindings,
) -> Result<Vec<Value>, ContractError> {
    expr.inputs()
        .iter()
        .map(|input| match input {
            Input::Subject => Ok(subject.clone()),
            Input::Param(name) => {
                bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ContractError::UnknownParameter {
                        function: function.to_string(),
                        name: name.clone(),
                    })
            }
        })
        .collect()
}

/// Where a contract sits and what it is checked against.
struct Site<'a> {
    function: &'a str,
    kind: ContractKind,
    parameter: Option<&'a str>,
    subject: &'a Value,
}

/// Evaluates one contract. `Ok(None)` means it held.
fn evaluate_contract(
    site: Site<'_>,
    expr: &Expr,
    bindings: &Bindings,
    trace: &mut Option<Vec<TraceEntry>>,
) -> Result<Option<ContractViolation>, ContractError> {
    let inputs = resolve_inputs(site.function, expr, site.subject, bindings)?;
    let passed = expr
        .check(&inputs)
        .map_err(|source| ContractError::Evaluation {
            function: site.function.to_string(),
            expression: expr.to_string(),
            source,
        })?;

    debug!(
        function = site.function,
        parameter = site.parameter.unwrap_or("return"),
        contract = %expr,
        passed,
        "evaluated contract"
    );

    if let Some(entries) = trace.as_mut() {
        entries.push(TraceEntry {
            kind: site.kind,
            parameter: site.parameter.map(str::to_string),
            expression: expr.to_string(),
            rendered: expr.render(&inputs),
            values: inputs.clone(),
            passed,
        });
    }

    if passed {
        return Ok(None);
    }

    let message = expr.render(&inputs);
    warn!(
        function = site.function,
        parameter = site.parameter.unwrap_or("return"),
        %message,
        "contract violated"
    );
    let actual_return = match site.kind {
        ContractKind::Postcondition => Some(site.subject.clone()),
        ContractKind::Precondition => None,
    };
    Ok(Some(ContractViolation {
        kind: site.kind,
        function: site.function.to_string(),
        parameter: site.parameter.map(str::to_string),
        expression: expr.to_string(),
        message,
        inputs,
        actual_return,
    }))
}

/// Checks parameter contracts in the order the parameters are bound,
/// which is signature order, whatever order the contracts were declared in.
///
/// Stops at the first violation, so later contracts are not evaluated.
pub fn check_preconditions(
    function: &str,
    contracts: &Contracts,
    bindings: &Bindings,
    trace: &mut Option<Vec<TraceEntry>>,
) -> Result<Option<ContractViolation>, ContractError> {
    if let Some((name, _)) = contracts
        .preconditions()
        .find(|(name, _)| !bindings.contains_key(*name))
    {
        return Err(ContractError::UnknownParameter {
            function: function.to_string(),
            name: name.to_string(),
        });
    }

    for (name, subject) in bindings {
        let Some(expr) = contracts.precondition(name) else {
            continue;
        };
        let site = Site {
            function,
            kind: ContractKind::Precondition,
            parameter: Some(name.as_str()),
            subject,
        };
        if let Some(violation) = evaluate_contract(site, expr, bindings, trace)? {
            return Ok(Some(violation));
        }
    }
    Ok(None)
}

/// Checks the return-value contract, if there is one.
pub fn check_postcondition(
    function: &str,
    contracts: &Contracts,
    return_value: &Value,
    bindings: &Bindings,
    trace: &mut Option<Vec<TraceEntry>>,
) -> Result<Option<ContractViolation>, ContractError> {
    let Some(expr) = contracts.postcondition() else {
        return Ok(None);
    };
    let site = Site {
        function,
        kind: ContractKind::Postcondition,
        parameter: None,
        subject: return_value,
    };
    evaluate_contract(site, expr, bindings, trace)
}
