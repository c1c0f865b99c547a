//! The in-memory suite tree.
//!
//! Suites and tests live in two arenas owned by [`SuiteTree`] and refer to each
//! other by index. A node's parent is fixed when it is created and nodes are
//! never removed, so an id stays valid for the lifetime of its tree.
//!
//! The tree is only ever grown: [`create_suite`](SuiteTree::create_suite) and
//! [`create_test`](SuiteTree::create_test) append to the parent's contents,
//! which keeps declaration order intact for execution.

use std::borrow::Cow;

use crate::action::ActionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiteId(usize);

impl SuiteId {
    /// The root suite every tree starts with.
    pub const ROOT: SuiteId = SuiteId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(usize);

/// A child of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Suite(SuiteId),
    Test(TestId),
}

impl From<SuiteId> for NodeId {
    fn from(id: SuiteId) -> Self {
        NodeId::Suite(id)
    }
}

impl From<TestId> for NodeId {
    fn from(id: TestId) -> Self {
        NodeId::Test(id)
    }
}

/// Selection flags shared by suites and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub only: bool,
    pub skip: bool,
}

/// How a declaration was marked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    #[default]
    None,
    Only,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Before,
    After,
    BeforeEach,
    AfterEach,
}

impl HookKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::Before => "before",
            HookKind::After => "after",
            HookKind::BeforeEach => "before_each",
            HookKind::AfterEach => "after_each",
        }
    }
}

#[derive(Debug, Default)]
pub struct Hooks {
    pub before: Vec<ActionHandle>,
    pub after: Vec<ActionHandle>,
    pub before_each: Vec<ActionHandle>,
    pub after_each: Vec<ActionHandle>,
}

impl Hooks {
    pub fn get(&self, kind: HookKind) -> &[ActionHandle] {
        match kind {
            HookKind::Before => &self.before,
            HookKind::After => &self.after,
            HookKind::BeforeEach => &self.before_each,
            HookKind::AfterEach => &self.after_each,
        }
    }

    fn get_mut(&mut self, kind: HookKind) -> &mut Vec<ActionHandle> {
        match kind {
            HookKind::Before => &mut self.before,
            HookKind::After => &mut self.after,
            HookKind::BeforeEach => &mut self.before_each,
            HookKind::AfterEach => &mut self.after_each,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct Suite {
    /// `None` only for the root.
    pub name: Option<Cow<'static, str>>,
    pub parent: Option<SuiteId>,
    pub flags: Flags,
    pub contents: Vec<NodeId>,
    pub hooks: Hooks,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct Test {
    pub name: Cow<'static, str>,
    pub suite: SuiteId,
    pub flags: Flags,
    pub action: ActionHandle,
}

#[derive(Debug)]
pub struct SuiteTree {
    suites: Vec<Suite>,
    tests: Vec<Test>,
}

impl Default for SuiteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiteTree {
    /// A tree holding only the unnamed root suite.
    pub fn new() -> Self {
        Self {
            suites: vec![Suite {
                name: None,
                parent: None,
                flags: Flags::default(),
                contents: Vec::new(),
                hooks: Hooks::default(),
            }],
            tests: Vec::new(),
        }
    }

    pub fn suite(&self, id: SuiteId) -> &Suite {
        &self.suites[id.0]
    }

    pub fn test(&self, id: TestId) -> &Test {
        &self.tests[id.0]
    }

    pub fn flags(&self, node: NodeId) -> Flags {
        match node {
            NodeId::Suite(id) => self.suite(id).flags,
            NodeId::Test(id) => self.test(id).flags,
        }
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Create an empty suite and append it to `parent`'s contents.
    pub fn create_suite(
        &mut self,
        parent: SuiteId,
        name: impl Into<Cow<'static, str>>,
    ) -> SuiteId {
        let id = SuiteId(self.suites.len());
        self.suites.push(Suite {
            name: Some(name.into()),
            parent: Some(parent),
            flags: Flags::default(),
            contents: Vec::new(),
            hooks: Hooks::default(),
        });
        self.suites[parent.0].contents.push(NodeId::Suite(id));
        id
    }

    /// Create a test and append it to `suite`'s contents.
    ///
    /// The action is stored, not called.
    pub fn create_test(
        &mut self,
        suite: SuiteId,
        name: impl Into<Cow<'static, str>>,
        action: ActionHandle,
    ) -> TestId {
        let id = TestId(self.tests.len());
        self.tests.push(Test {
            name: name.into(),
            suite,
            flags: Flags::default(),
            action,
        });
        self.suites[suite.0].contents.push(NodeId::Test(id));
        id
    }

    pub fn add_hook(&mut self, suite: SuiteId, kind: HookKind, action: ActionHandle) {
        self.suites[suite.0].hooks.get_mut(kind).push(action);
    }

    /// Mark `node` and every suite above it as `only`.
    ///
    /// Only-marking travels upwards, never down into children.
    pub fn mark_only(&mut self, node: NodeId) {
        let mut next = match node {
            NodeId::Suite(id) => Some(id),
            NodeId::Test(id) => {
                let test = &mut self.tests[id.0];
                test.flags.only = true;
                Some(test.suite)
            }
        };
        while let Some(id) = next {
            let suite = &mut self.suites[id.0];
            suite.flags.only = true;
            next = suite.parent;
        }
    }

    pub fn mark_skip(&mut self, node: NodeId) {
        match node {
            NodeId::Suite(id) => self.suites[id.0].flags.skip = true,
            NodeId::Test(id) => self.tests[id.0].flags.skip = true,
        }
    }

    pub fn apply_mark(&mut self, node: NodeId, mark: Mark) {
        match mark {
            Mark::None => {}
            Mark::Only => self.mark_only(node),
            Mark::Skip => self.mark_skip(node),
        }
    }

    /// Children of `suite` that survive only/skip filtering, in declaration order.
    ///
    /// When any direct child is `only`, non-only siblings are dropped. A `skip`
    /// child is always dropped, even if it is also `only`.
    pub fn selected_children(&self, suite: SuiteId) -> impl Iterator<Item = NodeId> + '_ {
        let contents = &self.suite(suite).contents;
        let contents_has_only = contents.iter().any(|node| self.flags(*node).only);
        contents.iter().copied().filter(move |node| {
            let flags = self.flags(*node);
            !(contents_has_only && !flags.only) && !flags.skip
        })
    }

    /// Number of tests below `suite` that would run.
    pub fn count_selected(&self, suite: SuiteId) -> usize {
        self.selected_children(suite)
            .map(|node| match node {
                NodeId::Test(_) => 1,
                NodeId::Suite(id) => self.count_selected(id),
            })
            .sum()
    }

    /// Tests below `suite` that would run, in execution order.
    pub fn selected_tests(&self, suite: SuiteId) -> Vec<TestId> {
        let mut tests = Vec::new();
        for node in self.selected_children(suite) {
            match node {
                NodeId::Test(id) => tests.push(id),
                NodeId::Suite(id) => tests.extend(self.selected_tests(id)),
            }
        }
        tests
    }

    /// Names from the outermost named suite down to `node`, inclusive.
    pub fn name_path(&self, node: NodeId) -> Vec<String> {
        let (mut names, mut next) = match node {
            NodeId::Suite(id) => (Vec::new(), Some(id)),
            NodeId::Test(id) => {
                let test = self.test(id);
                (vec![test.name.to_string()], Some(test.suite))
            }
        };
        while let Some(id) = next {
            let suite = self.suite(id);
            if let Some(name) = &suite.name {
                names.push(name.to_string());
            }
            next = suite.parent;
        }
        names.reverse();
        names
    }
}
