//! Read-only observers of dispatched actions.

use std::fmt::Debug;

/// Observes every atomic action together with the state it is about to be
/// folded over. Middleware cannot change the state.
///
/// Implementations should not panic; a panic is caught and logged by the
/// store worker and the fold continues.
pub trait Middleware<S, A>: Send + Sync {
    fn observe(&self, state: &S, action: &A);
}

impl<S, A, F> Middleware<S, A> for F
where
    F: Fn(&S, &A) + Send + Sync,
{
    fn observe(&self, state: &S, action: &A) {
        self(state, action)
    }
}

/// Logs each action and the pre-fold state at debug level.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware;

impl<S: Debug, A: Debug> Middleware<S, A> for LoggingMiddleware {
    fn observe(&self, state: &S, action: &A) {
        tracing::debug!(?action, ?state, "Action will mutate current state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn closure_is_a_middleware() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let middleware = move |state: &i64, action: &i64| {
            counter.fetch_add((*state + *action) as usize, Ordering::SeqCst);
        };

        Middleware::observe(&middleware, &2, &3);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn logging_middleware_accepts_debug_types() {
        let middleware: Box<dyn Middleware<Vec<u8>, &str>> = Box::new(LoggingMiddleware);
        middleware.observe(&vec![1, 2], &"noop");
    }
}
