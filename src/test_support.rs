use std::{
    cell::RefCell,
    io,
    rc::Rc,
    sync::{Arc, Mutex},
};

use crate::{
    config::{Config, ReportFormat},
    declare::BuildContext,
    engine::Engine,
    outcome::SuiteOutcome,
    reporter::{CollectingReporter, Event, Reporter, color::SupportsColor, with_reporters},
    tree::SuiteTree,
};

/// Records the order in which actions ran.
#[derive(Debug, Default, Clone)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    /// An action that appends `label` when called.
    pub fn push(&self, label: &str) -> impl Fn() + 'static {
        let log = Rc::clone(&self.0);
        let label = label.to_string();
        move || log.borrow_mut().push(label.clone())
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Declare a tree and run it through the engine, collecting every event.
pub fn run_declared(declare: impl FnOnce(&mut BuildContext<'_>)) -> (SuiteOutcome, Vec<Event>) {
    let mut tree = SuiteTree::new();
    declare(&mut BuildContext::new(&mut tree));

    let collecting = CollectingReporter::new();
    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(collecting.clone())];
    let (outcome, errors) = with_reporters(&mut reporters, |events| Engine::new(&tree, events).run());
    assert!(errors.is_empty());
    (outcome, collecting.events())
}

pub fn quiet_config() -> Config {
    Config {
        format: ReportFormat::None,
        ..Config::default()
    }
}

/// An in-memory reporter target that never supports color.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for SharedBuffer {
    fn supports_color(&self) -> bool {
        false
    }
}
