use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use workflow_types::{Activation, ActivationCompletion, CoreError};

use crate::dispatcher::ActivationOutcome;

/// A future boxed for dynamic dispatch. Workflow state is confined to one
/// `LocalSet` (§5), so this deliberately does not require `Send`.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

type BaseActivate = Rc<dyn Fn(Activation, usize) -> BoxFuture<Result<ActivationOutcome, CoreError>>>;
type BaseConclude = Rc<dyn Fn() -> BoxFuture<ActivationCompletion>>;

/// Middleware wrapping `activate`. Each link receives the activation plus a
/// `next` continuation representing "the rest of the chain, then the base
/// handler" -- it may inspect/transform the input, call `next`, and
/// inspect/transform the output.
pub trait ActivateInterceptor {
    fn intercept(
        &self,
        activation: Activation,
        batch_index: usize,
        next: NextActivate,
    ) -> BoxFuture<Result<ActivationOutcome, CoreError>>;
}

/// The remaining portion of an `activate` chain: the middlewares not yet run
/// plus the base dispatcher handler at the end.
pub struct NextActivate {
    remaining: std::vec::IntoIter<Rc<dyn ActivateInterceptor>>,
    base: BaseActivate,
}

impl NextActivate {
    pub fn call(mut self, activation: Activation, batch_index: usize) -> BoxFuture<Result<ActivationOutcome, CoreError>> {
        match self.remaining.next() {
            Some(middleware) => {
                let next = NextActivate {
                    remaining: self.remaining,
                    base: self.base,
                };
                middleware.intercept(activation, batch_index, next)
            }
            None => (self.base)(activation, batch_index),
        }
    }
}

/// Middleware wrapping `conclude_activation`.
pub trait ConcludeInterceptor {
    fn intercept(&self, next: NextConclude) -> BoxFuture<ActivationCompletion>;
}

pub struct NextConclude {
    remaining: std::vec::IntoIter<Rc<dyn ConcludeInterceptor>>,
    base: BaseConclude,
}

impl NextConclude {
    pub fn call(mut self) -> BoxFuture<ActivationCompletion> {
        match self.remaining.next() {
            Some(middleware) => {
                let next = NextConclude {
                    remaining: self.remaining,
                    base: self.base,
                };
                middleware.intercept(next)
            }
            None => (self.base)(),
        }
    }
}

/// A module's contribution to the interceptor chains, returned by
/// `init_runtime`'s interceptor-module loader (§4.8 step 5).
///
/// `inbound` / `outbound` / `internals` belong to the higher-level workflow
/// API; the core holds them only so a factory's full output round-trips,
/// without interpreting their contents (§4.7).
pub struct InterceptorModule {
    pub activate: Option<Rc<dyn ActivateInterceptor>>,
    pub conclude: Option<Rc<dyn ConcludeInterceptor>>,
    pub inbound: Option<Rc<dyn std::any::Any>>,
    pub outbound: Option<Rc<dyn std::any::Any>>,
    pub internals: Option<Rc<dyn std::any::Any>>,
}

/// The composed set of interceptors installed for one run.
#[derive(Default)]
pub struct InterceptorChain {
    activate: Vec<Rc<dyn ActivateInterceptor>>,
    conclude: Vec<Rc<dyn ConcludeInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, module: InterceptorModule) {
        if let Some(activate) = module.activate {
            self.activate.push(activate);
        }
        if let Some(conclude) = module.conclude {
            self.conclude.push(conclude);
        }
    }

    pub fn run_activate(
        &self,
        activation: Activation,
        batch_index: usize,
        base: BaseActivate,
    ) -> BoxFuture<Result<ActivationOutcome, CoreError>> {
        let next = NextActivate {
            remaining: self.activate.clone().into_iter(),
            base,
        };
        next.call(activation, batch_index)
    }

    pub fn run_conclude(&self, base: BaseConclude) -> BoxFuture<ActivationCompletion> {
        let next = NextConclude {
            remaining: self.conclude.clone().into_iter(),
            base,
        };
        next.call()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::{Command, Payload};
    use workflow_types::Codec;

    struct CountingActivate {
        calls: Rc<std::cell::Cell<usize>>,
    }

    impl ActivateInterceptor for CountingActivate {
        fn intercept(
            &self,
            activation: Activation,
            batch_index: usize,
            next: NextActivate,
        ) -> BoxFuture<Result<ActivationOutcome, CoreError>> {
            self.calls.set(self.calls.get() + 1);
            next.call(activation, batch_index)
        }
    }

    #[tokio::test]
    async fn activate_chain_runs_middleware_then_base() {
        let calls = Rc::new(std::cell::Cell::new(0));
        let mut chain = InterceptorChain::new();
        chain.install(InterceptorModule {
            activate: Some(Rc::new(CountingActivate {
                calls: Rc::clone(&calls),
            })),
            conclude: None,
            inbound: None,
            outbound: None,
            internals: None,
        });

        let base: BaseActivate = Rc::new(|_activation, _batch_index| {
            Box::pin(async {
                Ok(ActivationOutcome {
                    pending_external_calls: vec![],
                    num_blocked_conditions: 0,
                })
            })
        });

        let activation = Activation::new(None, false, vec![]);
        let outcome = chain.run_activate(activation, 0, base).await.unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(outcome.num_blocked_conditions, 0);
    }

    #[tokio::test]
    async fn conclude_chain_runs_to_base_with_no_middleware() {
        let chain = InterceptorChain::new();
        let base: BaseConclude = Rc::new(|| {
            Box::pin(async {
                ActivationCompletion {
                    run_id: "run-1".to_string(),
                    commands: vec![Command::CompleteWorkflowExecution {
                        result: Payload::new(vec![], Codec::Json),
                    }],
                }
            })
        });

        let completion = chain.run_conclude(base).await;

        assert_eq!(completion.run_id, "run-1");
        assert_eq!(completion.commands.len(), 1);
    }
}
