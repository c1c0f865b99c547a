//! Callables stored in the suite tree.
//!
//! Test bodies and hooks are both "actions": zero-argument callables that
//! either complete or fail. An action may be a plain function pointer, a boxed
//! closure, or a factory for a future. Futures are driven to completion on the
//! calling thread before the next action starts, so actions never overlap.

use std::{
    any::Any,
    cell::Cell,
    fmt::{self, Debug, Display},
    future::Future,
    panic::{self, AssertUnwindSafe, catch_unwind},
    sync::Once,
};

/// A handle to a test body or hook.
#[non_exhaustive]
pub enum ActionHandle {
    Ptr(fn() -> ActionResult),
    Owned(Box<dyn Action>),
}

impl Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ptr(ptr) => f.debug_tuple("Ptr").field(ptr).finish(),
            Self::Owned(_) => write!(f, "Owned(...)"),
        }
    }
}

impl Default for ActionHandle {
    fn default() -> Self {
        Self::Ptr(|| ActionResult(Ok(())))
    }
}

impl ActionHandle {
    /// Wrap a function producing a future.
    ///
    /// A fresh future is created for every call and blocked on until it settles.
    pub fn from_future<F, Fut, T>(f: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = T>,
        T: Into<ActionResult>,
    {
        Self::Owned(Box::new(move || -> ActionResult {
            futures::executor::block_on(f()).into()
        }))
    }

    /// Run the action, turning a panic into an [`ActionError::Panicked`].
    ///
    /// The panic message is not printed, it ends up in the returned error.
    pub fn call(&self) -> Result<(), ActionError> {
        let _guard = QuietPanicGuard::enter();
        let result = catch_unwind(AssertUnwindSafe(|| match self {
            Self::Ptr(f) => f(),
            Self::Owned(f) => f.call_action(),
        }));
        match result {
            Ok(ActionResult(Ok(()))) => Ok(()),
            Ok(ActionResult(Err(msg))) => Err(ActionError::Failed(msg)),
            Err(payload) => Err(ActionError::Panicked(payload_as_string(payload))),
        }
    }
}

impl<F> From<F> for ActionHandle
where
    F: Action + 'static,
{
    fn from(f: F) -> Self {
        Self::Owned(Box::new(f))
    }
}

pub trait Action {
    fn call_action(&self) -> ActionResult;
}

impl<F, T> Action for F
where
    F: Fn() -> T,
    T: Into<ActionResult>,
{
    fn call_action(&self) -> ActionResult {
        (self)().into()
    }
}

#[derive(Debug)]
pub struct ActionResult(pub Result<(), String>);

impl From<()> for ActionResult {
    fn from(_: ()) -> Self {
        Self(Ok(()))
    }
}

impl<E: Debug> From<Result<(), E>> for ActionResult {
    fn from(v: Result<(), E>) -> Self {
        ActionResult(v.map_err(|e| format!("{e:#?}")))
    }
}

/// Why an action did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action returned an error.
    Failed(String),
    /// The action panicked, the payload is rendered as a string.
    Panicked(String),
}

impl Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(msg) => write!(f, "Error: {msg}"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

thread_local! {
    static IN_ACTION: Cell<bool> = const { Cell::new(false) };
}

static QUIET_PANIC_HOOK: Once = Once::new();

/// Keeps the panic hook quiet for panics raised inside an action on this thread.
///
/// The hook is installed once per process and forwards every other panic to
/// the hook that was set before it.
struct QuietPanicGuard(bool);

impl QuietPanicGuard {
    fn enter() -> Self {
        QUIET_PANIC_HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if !IN_ACTION.get() {
                    previous(info);
                }
            }));
        });
        Self(IN_ACTION.replace(true))
    }
}

impl Drop for QuietPanicGuard {
    fn drop(&mut self) {
        IN_ACTION.set(self.0);
    }
}

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
/// Other payload types are formatted as a generic placeholder.
pub fn payload_as_string(err: Box<dyn Any + Send + 'static>) -> String {
    err.downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|err| err.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[test]
    fn unit_and_ok_results_pass() {
        assert_eq!(ActionHandle::default().call(), Ok(()));
        assert_eq!(ActionHandle::from(|| Ok::<(), String>(())).call(), Ok(()));
    }

    #[test]
    fn errors_are_rendered_with_debug() {
        let action = ActionHandle::from(|| Err::<(), _>("nope"));
        assert_eq!(action.call(), Err(ActionError::Failed("\"nope\"".into())));
    }

    #[test]
    fn panics_are_caught() {
        let action = ActionHandle::from(|| -> () { panic!("boom {}", 42) });
        assert_eq!(action.call(), Err(ActionError::Panicked("boom 42".into())));
    }

    #[test]
    fn panic_output_is_silenced_only_inside_actions() {
        let inside = Rc::new(Cell::new(false));
        let action = ActionHandle::from({
            let inside = Rc::clone(&inside);
            move || -> () {
                inside.set(IN_ACTION.get());
                panic!("quiet");
            }
        });

        assert!(!IN_ACTION.get());
        assert_eq!(action.call(), Err(ActionError::Panicked("quiet".into())));
        assert!(inside.get());
        assert!(!IN_ACTION.get());
    }

    #[test]
    fn futures_are_driven_to_completion() {
        let hits = Rc::new(Cell::new(0));
        let action = ActionHandle::from_future({
            let hits = Rc::clone(&hits);
            move || {
                let hits = Rc::clone(&hits);
                async move {
                    futures::future::ready(()).await;
                    hits.set(hits.get() + 1);
                }
            }
        });

        assert_eq!(action.call(), Ok(()));
        assert_eq!(action.call(), Ok(()));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn failing_futures_fail() {
        let action = ActionHandle::from_future(|| async { Err::<(), _>("late") });
        assert_eq!(action.call(), Err(ActionError::Failed("\"late\"".into())));
    }
}
