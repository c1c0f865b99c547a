//! Free-function declaration API.
//!
//! Spec files written against the ambient API call [`describe`], [`it`] and
//! friends without a [`BuildContext`] in hand. These functions only work while
//! a tree is bound to the current thread through [`bind`], which the session
//! does for ambient loaders when globals are enabled. Calling them while
//! nothing is bound panics.
//!
//! [`BuildContext`]: crate::declare::BuildContext

use std::{
    borrow::Cow,
    cell::RefCell,
    mem,
    panic::{AssertUnwindSafe, catch_unwind, resume_unwind},
};

use crate::{
    action::ActionHandle,
    declare::BuildContext,
    tree::{HookKind, Mark, SuiteId, SuiteTree, TestId},
};

struct Bound {
    tree: SuiteTree,
    current: SuiteId,
}

thread_local! {
    static BOUND: RefCell<Option<Bound>> = const { RefCell::new(None) };
}

pub(crate) const UNBOUND_MESSAGE: &str =
    "ambient declaration API is not bound, enable globals to load this spec file";

/// Bind `tree` for the duration of `f`, with the cursor at the root.
///
/// The tree is handed back even if `f` panics, the panic is resumed afterwards.
/// Nested binds on one thread are not supported and panic.
pub fn bind<R>(tree: &mut SuiteTree, f: impl FnOnce() -> R) -> R {
    BOUND.with_borrow_mut(|bound| {
        assert!(bound.is_none(), "ambient declaration API is already bound");
        *bound = Some(Bound {
            tree: mem::take(tree),
            current: SuiteId::ROOT,
        });
    });

    let result = catch_unwind(AssertUnwindSafe(f));

    if let Some(bound) = BOUND.with_borrow_mut(Option::take) {
        *tree = bound.tree;
    }
    match result {
        Ok(value) => value,
        Err(payload) => resume_unwind(payload),
    }
}

/// Whether a tree is bound on this thread.
pub fn is_bound() -> bool {
    BOUND.with_borrow(Option::is_some)
}

fn with_context<R>(f: impl FnOnce(&mut BuildContext<'_>) -> R) -> R {
    BOUND.with_borrow_mut(|bound| {
        let Some(bound) = bound else {
            panic!("{UNBOUND_MESSAGE}");
        };
        let mut cx = BuildContext::at(&mut bound.tree, bound.current);
        f(&mut cx)
    })
}

fn set_current(id: SuiteId) {
    BOUND.with_borrow_mut(|bound| {
        if let Some(bound) = bound {
            bound.current = id;
        }
    });
}

fn current() -> SuiteId {
    with_context(|cx| cx.current())
}

/// Declare a suite. The binding is released while `body` runs so the body can
/// declare further nodes.
pub fn describe_marked(name: impl Into<Cow<'static, str>>, mark: Mark, body: impl FnOnce()) {
    let previous = current();
    let id = with_context(|cx| cx.open_suite(name, mark));
    set_current(id);
    let result = catch_unwind(AssertUnwindSafe(body));
    set_current(previous);
    if let Err(payload) = result {
        resume_unwind(payload);
    }
}

pub fn describe(name: impl Into<Cow<'static, str>>, body: impl FnOnce()) {
    describe_marked(name, Mark::None, body)
}

pub fn describe_only(name: impl Into<Cow<'static, str>>, body: impl FnOnce()) {
    describe_marked(name, Mark::Only, body)
}

pub fn describe_skip(name: impl Into<Cow<'static, str>>, body: impl FnOnce()) {
    describe_marked(name, Mark::Skip, body)
}

pub fn suite(name: impl Into<Cow<'static, str>>, body: impl FnOnce()) {
    describe(name, body)
}

pub fn test(name: impl Into<Cow<'static, str>>, action: impl Into<ActionHandle>) -> TestId {
    with_context(|cx| cx.test(name, action))
}

pub fn test_only(name: impl Into<Cow<'static, str>>, action: impl Into<ActionHandle>) -> TestId {
    with_context(|cx| cx.test_only(name, action))
}

pub fn test_skip(name: impl Into<Cow<'static, str>>, action: impl Into<ActionHandle>) -> TestId {
    with_context(|cx| cx.test_skip(name, action))
}

pub fn it(name: impl Into<Cow<'static, str>>, action: impl Into<ActionHandle>) -> TestId {
    test(name, action)
}

pub fn it_only(name: impl Into<Cow<'static, str>>, action: impl Into<ActionHandle>) -> TestId {
    test_only(name, action)
}

pub fn it_skip(name: impl Into<Cow<'static, str>>, action: impl Into<ActionHandle>) -> TestId {
    test_skip(name, action)
}

pub fn before(action: impl Into<ActionHandle>) {
    with_context(|cx| cx.hook(HookKind::Before, action))
}

pub fn after(action: impl Into<ActionHandle>) {
    with_context(|cx| cx.hook(HookKind::After, action))
}

pub fn before_each(action: impl Into<ActionHandle>) {
    with_context(|cx| cx.hook(HookKind::BeforeEach, action))
}

pub fn after_each(action: impl Into<ActionHandle>) {
    with_context(|cx| cx.hook(HookKind::AfterEach, action))
}
