kisuite::spec_file!(EXPLICIT, |cx| {
    cx.describe("explicit", |cx| {
        cx.it("adds", || assert_eq!(1 + 1, 2));
    });
});
