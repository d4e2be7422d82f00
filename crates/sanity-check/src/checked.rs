//! The enforcement wrapper: a function body plus its signature and contracts.
//!
//! Every [`CheckedFn::call`] runs the same protocol:
//! 1. bind the arguments to the signature, applying defaults
//! 2. check each parameter contract in declaration order
//! 3. run the body; its error is returned unchanged
//! 4. check the return-value contract
//! 5. hand back the body's value

use std::env;

use tracing::{info, warn};

use sanity_core::Value;

use crate::contracts::check::{check_postcondition, check_preconditions};
use crate::contracts::Contracts;
use crate::error::{CallError, ContractError};
use crate::signature::{Args, Bindings, Signature};
use crate::trace::TraceEntry;

/// Which checks a [`CheckedFn`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckConfig {
    /// Check parameter contracts before the body runs.
    pub preconditions: bool,
    /// Check the return-value contract after the body returns.
    pub postconditions: bool,
    /// Log every evaluated contract at `info` level from [`CheckedFn::call`].
    pub trace_enabled: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            preconditions: true,
            postconditions: true,
            trace_enabled: false,
        }
    }
}

impl CheckConfig {
    /// Reads configuration from the environment.
    ///
    /// - `SANITY_CHECKS`: `all` (default), `pre`, `post` or `off`
    /// - `SANITY_TRACE`: `1` or `true` enables trace logging
    pub fn from_env() -> Self {
        let checks = env::var("SANITY_CHECKS").ok();
        let trace = env::var("SANITY_TRACE").ok();
        CheckConfig::from_vars(checks.as_deref(), trace.as_deref())
    }

    fn from_vars(checks: Option<&str>, trace: Option<&str>) -> Self {
        let (preconditions, postconditions) = match checks.map(str::trim) {
            None | Some("") | Some("all") => (true, true),
            Some("pre") => (true, false),
            Some("post") => (false, true),
            Some("off") => (false, false),
            Some(other) => {
                warn!(value = other, "unrecognized SANITY_CHECKS value, checking everything");
                (true, true)
            }
        };
        let trace_enabled = matches!(
            trace.map(|t| t.trim().to_ascii_lowercase()).as_deref(),
            Some("1") | Some("true")
        );
        CheckConfig {
            preconditions,
            postconditions,
            trace_enabled,
        }
    }
}

/// A function body wrapped with contract enforcement.
///
/// The calling convention is unchanged: the same [`Args`] a caller would
/// bind against the signature go in, the body's value comes out.
pub struct CheckedFn<F> {
    signature: Signature,
    contracts: Contracts,
    config: CheckConfig,
    body: F,
}

impl<F> CheckedFn<F> {
    /// Wraps `body`, checking up front that every contract key and every
    /// named selector refers to a declared parameter.
    pub fn new(signature: Signature, contracts: Contracts, body: F) -> Result<Self, ContractError> {
        if let Some(name) = contracts
            .referenced_params()
            .find(|name| !signature.has_param(name))
        {
            return Err(ContractError::UnknownParameter {
                function: signature.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(CheckedFn {
            signature,
            contracts,
            config: CheckConfig::default(),
            body,
        })
    }

    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    pub fn config(&self) -> CheckConfig {
        self.config
    }

    /// Calls the body with contract checks around it.
    pub fn call<E>(&self, args: &Args) -> Result<Value, CallError<E>>
    where
        F: Fn(&Bindings) -> Result<Value, E>,
    {
        let mut trace = self.config.trace_enabled.then(Vec::new);
        let result = self.run(args, &mut trace);
        for entry in trace.into_iter().flatten() {
            info!(
                function = %self.signature.name,
                kind = ?entry.kind,
                parameter = entry.parameter.as_deref().unwrap_or("return"),
                rendered = %entry.rendered,
                passed = entry.passed,
                "contract trace"
            );
        }
        result
    }

    /// Like [`CheckedFn::call`], and also returns every contract evaluated
    /// along the way, including the one that failed.
    pub fn call_traced<E>(&self, args: &Args) -> (Result<Value, CallError<E>>, Vec<TraceEntry>)
    where
        F: Fn(&Bindings) -> Result<Value, E>,
    {
        let mut trace = Some(Vec::new());
        let result = self.run(args, &mut trace);
        (result, trace.unwrap_or_default())
    }

    fn run<E>(
        &self,
        args: &Args,
        trace: &mut Option<Vec<TraceEntry>>,
    ) -> Result<Value, CallError<E>>
    where
        F: Fn(&Bindings) -> Result<Value, E>,
    {
        let name = self.signature.name.as_str();
        let bindings = self.signature.bind(args)?;

        if self.config.preconditions {
            if let Some(violation) = check_preconditions(name, &self.contracts, &bindings, trace)? {
                return Err(CallError::Precondition(violation));
            }
        }

        let value = (self.body)(&bindings).map_err(CallError::Body)?;

        if self.config.postconditions {
            if let Some(violation) =
                check_postcondition(name, &self.contracts, &value, &bindings, trace)?
            {
                return Err(CallError::Postcondition(violation));
            }
        }

        Ok(value)
    }
}
