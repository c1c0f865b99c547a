use kisuite::ambient::*;

kisuite::spec_file!(AMBIENT, || {
    describe("ambient", || {
        it("declared without a context", || ());
    });
});
