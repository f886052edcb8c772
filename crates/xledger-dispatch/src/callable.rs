//! Destination-side callables.
//!
//! Programs on the destination chain register a [`CallableExecutor`] under
//! the [`CallTarget`] they answer to. After an inbound credit, the
//! dispatcher runs the leg's callables in order. A failing callable is
//! logged and skipped: the credit and the reference status stand.

use std::collections::HashMap;

use tracing::{debug, warn};
use xledger_types::{
    CallTarget, Callable, ChainId, HolderId, ReferenceId, ResourceId, Result, TransferValue,
    XledgerError,
};

/// What a callable gets to see about the credit it follows.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub chain: ChainId,
    pub origin_chain: ChainId,
    pub reference_id: ReferenceId,
    pub resource_id: ResourceId,
    pub holder: HolderId,
    pub value: &'a TransferValue,
}

/// A program that can be invoked by inbound transfers.
pub trait CallableExecutor: Send {
    fn execute(&mut self, ctx: &CallContext<'_>, payload: &[u8]) -> Result<()>;
}

/// Routes callables to the executors registered on this chain.
#[derive(Default)]
pub struct CallableRouter {
    executors: HashMap<CallTarget, Box<dyn CallableExecutor>>,
}

impl CallableRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the executor for `target`.
    pub fn register(&mut self, target: CallTarget, executor: Box<dyn CallableExecutor>) {
        self.executors.insert(target, executor);
    }

    #[must_use]
    pub fn is_registered(&self, target: &CallTarget) -> bool {
        self.executors.contains_key(target)
    }

    /// Run every callable in order. Returns the failures, already logged.
    pub fn run(&mut self, ctx: &CallContext<'_>, callables: &[Callable]) -> Vec<XledgerError> {
        let mut failures = Vec::new();
        for (index, callable) in callables.iter().enumerate() {
            let result = match self.executors.get_mut(&callable.target) {
                Some(executor) => executor.execute(ctx, &callable.payload),
                None => Err(XledgerError::CallableFailed {
                    target: callable.target.to_string(),
                    reason: "no executor registered".into(),
                }),
            };
            match result {
                Ok(()) => debug!(reference = %ctx.reference_id, index, target = %callable.target, "Callable executed"),
                Err(e) => {
                    let err = match e {
                        e @ XledgerError::CallableFailed { .. } => e,
                        other => XledgerError::CallableFailed {
                            target: callable.target.to_string(),
                            reason: other.to_string(),
                        },
                    };
                    warn!(
                        reference = %ctx.reference_id,
                        chain = %ctx.chain,
                        index,
                        error = %err,
                        "Callable failed; credit kept"
                    );
                    failures.push(err);
                }
            }
        }
        failures
    }
}
