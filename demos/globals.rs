//! `cargo run --example globals -- --globals`
//!
//! Without `--globals` this spec file refuses to load.

use std::{
    process::ExitCode,
    sync::atomic::{AtomicUsize, Ordering},
};

use kisuite::ambient::*;

static CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

kisuite::spec_file!(GLOBALS, || {
    describe("connection pool", || {
        before(|| {
            CONNECTIONS.store(4, Ordering::SeqCst);
        });
        after(|| {
            CONNECTIONS.store(0, Ordering::SeqCst);
        });

        it("starts with four connections", || {
            assert_eq!(CONNECTIONS.load(Ordering::SeqCst), 4)
        });

        describe("checkout", || {
            before_each(|| {
                CONNECTIONS.fetch_sub(1, Ordering::SeqCst);
            });
            after_each(|| {
                CONNECTIONS.fetch_add(1, Ordering::SeqCst);
            });

            it("takes one connection", || {
                assert_eq!(CONNECTIONS.load(Ordering::SeqCst), 3)
            });
        });
    });
});

fn main() -> ExitCode {
    kisuite::main()
}
