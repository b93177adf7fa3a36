//! Reference suite exercising every lifecycle path
//!
//! The root passes on its own; several children fail on purpose, one of
//! them by timing out, so the rendered tree shows each outcome once.

use std::time::Duration;

use crate::assert;
use crate::builder::TestBuilder;
use crate::executor::Test;

pub fn demo() -> Test {
    TestBuilder::root("Root Test").body(|t| {
        assert::ok(true)?;

        t.test("S1").run(|_| Ok(assert::ok(true)?));

        t.test("S2").run(|t| {
            assert::ok(true)?;
            t.test("S21").run(|_| Ok(assert::ok(true)?));
            Ok(())
        });

        t.test("S3").run(|_| Ok(assert::ok(false)?));

        t.test("S4").asynchronous().run(|t| {
            assert::ok(true)?;
            t.pass();
            Ok(())
        });

        t.test("S5").run(|t| {
            t.fail("Foobar");
            Ok(())
        });

        // Never resolves, so it fails when the timer fires
        t.test("S6")
            .timeout(Duration::from_millis(20))
            .run(|_| Ok(assert::ok(true)?));

        t.test("S7").skip(|_| Ok(assert::ok(false)?));

        t.test("S8").run(|t| {
            t.test("S81").assert().ok(true);
            t.test("S82").assert().equal(true, true);
            t.test("S83").assert().equal(true, false);
            Ok(())
        });

        Ok(())
    })
}
