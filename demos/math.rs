//! `cargo run --example math -- --format terse`

use std::process::ExitCode;

fn divide(a: i32, b: i32) -> Result<i32, String> {
    match b {
        0 => Err(format!("cannot divide {a} by zero")),
        b => Ok(a / b),
    }
}

kisuite::spec_file!(MATH, |cx| {
    cx.describe("math", |cx| {
        cx.before_each(|| log::debug!("fresh numbers"));

        cx.describe("addition", |cx| {
            cx.it("adds two numbers", || assert_eq!(1 + 2, 3));
            cx.it("is commutative", || assert_eq!(2 + 5, 5 + 2));
        });

        cx.describe("division", |cx| {
            cx.it("divides evenly", || -> Result<(), String> {
                assert_eq!(divide(9, 3)?, 3);
                Ok(())
            });
            cx.it("rejects zero", || assert!(divide(1, 0).is_err()));
            cx.it_skip("handles overflow", || assert_eq!(divide(i32::MIN, -1), Ok(0)));
        });
    });
});

fn main() -> ExitCode {
    kisuite::main()
}
