//! The declaration API used by spec files.
//!
//! A [`BuildContext`] is handed to a loader and carries the cursor pointing at
//! the suite currently being populated. `describe` moves the cursor into a new
//! suite for the duration of its body and always moves it back, even when the
//! body panics.
//!
//! ```
//! use kisuite::session::Session;
//!
//! let mut session = Session::new();
//! session.declare(|cx| {
//!     cx.describe("math", |cx| {
//!         cx.before_each(|| ());
//!         cx.it("adds", || assert_eq!(1 + 1, 2));
//!         cx.it_skip("divides by zero", || ());
//!     });
//! });
//! assert_eq!(session.tree().test_count(), 2);
//! ```

use std::{
    borrow::Cow,
    mem,
    panic::{AssertUnwindSafe, catch_unwind, resume_unwind},
};

use crate::{
    action::ActionHandle,
    tree::{HookKind, Mark, NodeId, SuiteId, SuiteTree, TestId},
};

pub struct BuildContext<'t> {
    tree: &'t mut SuiteTree,
    current: SuiteId,
}

impl<'t> BuildContext<'t> {
    /// A context whose cursor starts at the root suite.
    pub fn new(tree: &'t mut SuiteTree) -> Self {
        Self::at(tree, SuiteId::ROOT)
    }

    pub fn at(tree: &'t mut SuiteTree, current: SuiteId) -> Self {
        Self { tree, current }
    }

    /// The suite declarations currently attach to.
    pub fn current(&self) -> SuiteId {
        self.current
    }

    pub fn tree(&self) -> &SuiteTree {
        self.tree
    }

    /// Create a suite below the cursor without entering it.
    pub fn open_suite(&mut self, name: impl Into<Cow<'static, str>>, mark: Mark) -> SuiteId {
        let name = name.into();
        log::debug!("declaring suite {name:?} ({mark:?})");
        let id = self.tree.create_suite(self.current, name);
        self.tree.apply_mark(NodeId::Suite(id), mark);
        id
    }

    /// Declare a suite and run `body` with the cursor inside it.
    pub fn describe_marked<F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        mark: Mark,
        body: F,
    ) -> SuiteId
    where
        F: FnOnce(&mut BuildContext<'t>),
    {
        let id = self.open_suite(name, mark);
        let previous = mem::replace(&mut self.current, id);
        let result = catch_unwind(AssertUnwindSafe(|| body(self)));
        self.current = previous;
        if let Err(payload) = result {
            resume_unwind(payload);
        }
        id
    }

    pub fn describe<F>(&mut self, name: impl Into<Cow<'static, str>>, body: F) -> SuiteId
    where
        F: FnOnce(&mut BuildContext<'t>),
    {
        self.describe_marked(name, Mark::None, body)
    }

    pub fn describe_only<F>(&mut self, name: impl Into<Cow<'static, str>>, body: F) -> SuiteId
    where
        F: FnOnce(&mut BuildContext<'t>),
    {
        self.describe_marked(name, Mark::Only, body)
    }

    pub fn describe_skip<F>(&mut self, name: impl Into<Cow<'static, str>>, body: F) -> SuiteId
    where
        F: FnOnce(&mut BuildContext<'t>),
    {
        self.describe_marked(name, Mark::Skip, body)
    }

    /// Alias of [`describe`](Self::describe).
    pub fn suite<F>(&mut self, name: impl Into<Cow<'static, str>>, body: F) -> SuiteId
    where
        F: FnOnce(&mut BuildContext<'t>),
    {
        self.describe(name, body)
    }

    /// Declare a test in the current suite. The action is stored, not run.
    pub fn test_marked(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        mark: Mark,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        let name = name.into();
        log::debug!("declaring test {name:?} ({mark:?})");
        let id = self.tree.create_test(self.current, name, action.into());
        self.tree.apply_mark(NodeId::Test(id), mark);
        id
    }

    pub fn test(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        self.test_marked(name, Mark::None, action)
    }

    pub fn test_only(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        self.test_marked(name, Mark::Only, action)
    }

    pub fn test_skip(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        self.test_marked(name, Mark::Skip, action)
    }

    pub fn it(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        self.test(name, action)
    }

    pub fn it_only(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        self.test_only(name, action)
    }

    pub fn it_skip(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        action: impl Into<ActionHandle>,
    ) -> TestId {
        self.test_skip(name, action)
    }

    pub fn hook(&mut self, kind: HookKind, action: impl Into<ActionHandle>) {
        log::trace!("registering {} hook on {:?}", kind.as_str(), self.current);
        self.tree.add_hook(self.current, kind, action.into());
    }

    pub fn before(&mut self, action: impl Into<ActionHandle>) {
        self.hook(HookKind::Before, action)
    }

    pub fn after(&mut self, action: impl Into<ActionHandle>) {
        self.hook(HookKind::After, action)
    }

    pub fn before_each(&mut self, action: impl Into<ActionHandle>) {
        self.hook(HookKind::BeforeEach, action)
    }

    pub fn after_each(&mut self, action: impl Into<ActionHandle>) {
        self.hook(HookKind::AfterEach, action)
    }
}
