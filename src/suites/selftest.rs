//! The engine testing itself
//!
//! Each check builds a standalone "test under test", watches its event
//! stream and resolves the outer test from the observed signals.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::assert;
use crate::builder::TestBuilder;
use crate::executor::{Emitter, Phase, RunContext, Test, TestEvent};
use crate::models::{Path, Status, TestError};

const UNDER_TEST: &str = "Test under test";

fn wait() -> Duration {
    Duration::from_millis(50)
}

pub fn selftest() -> Test {
    TestBuilder::root("A Test should").body(|t| {
        t.test("Be an event source").run(|_| {
            let ut = Test::noop(UNDER_TEST);
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = seen.clone();
            ut.subscribe(Rc::new(move |event: &TestEvent| {
                sink.borrow_mut().push(event.clone())
            }));

            ut.run();

            let seen = seen.borrow();
            assert::equal(seen.len(), 3)?;
            assert::ok(seen[2].is_finished())?;
            Ok(())
        });

        t.test("Pass its run context to the body").run(|_| {
            let received: Rc<RefCell<Option<RunContext>>> = Rc::new(RefCell::new(None));
            let slot = received.clone();
            let ut = Test::new(UNDER_TEST, move |ut| {
                *slot.borrow_mut() = Some(ut.clone());
                Ok(())
            });

            let ctx = ut.run();

            let received = received.borrow();
            assert::ok(received.as_ref().is_some_and(|r| r.same_run(&ctx)))?;
            Ok(())
        });

        t.test("Emit the status signal when run")
            .timeout(wait())
            .run(|t| {
                let ut = Test::noop(UNDER_TEST);
                let t = t.clone();
                ut.on_status(move |signal| {
                    if signal.status == Status::Running {
                        t.test("Which has an empty path")
                            .assert()
                            .ok(signal.path.is_empty());
                        t.test("And the test's name")
                            .assert()
                            .equal(signal.name.as_str(), UNDER_TEST);
                        t.pass();
                    }
                });
                ut.run();
                Ok(())
            });

        t.test("Have an async timeout that").run(|t| {
            t.test("Suppresses the pass on return").run(|_| {
                let ut = Test::noop(UNDER_TEST).with_timeout(Duration::from_millis(1));
                let passed = Rc::new(Cell::new(false));
                let flag = passed.clone();
                ut.on_status(move |signal| {
                    if signal.status == Status::Passed {
                        flag.set(true);
                    }
                });

                let ctx = ut.run();

                assert::ok(!passed.get())?;
                assert::equal(ctx.phase(), Phase::Running)?;
                Ok(())
            });

            t.test("Emits passed on pass").timeout(wait()).run(|t| {
                let ut = Test::new(UNDER_TEST, |ut| {
                    ut.pass();
                    Ok(())
                })
                .with_timeout(wait());
                let t = t.clone();
                ut.on_status(move |signal| {
                    if signal.status == Status::Passed {
                        t.pass();
                    }
                });
                ut.run();
                Ok(())
            });

            t.test("Times out after the specified duration")
                .timeout(wait())
                .run(|t| {
                    let ut = Test::noop(UNDER_TEST).with_timeout(Duration::from_millis(20));
                    let t = t.clone();
                    ut.on_status(move |signal| {
                        if signal.error.as_ref().is_some_and(|e| e.is_timeout()) {
                            t.pass();
                        }
                    });
                    ut.run();
                    Ok(())
                });

            Ok(())
        });

        t.test("Be able to create child tests").run(|t| {
            t.test("Whose status reaches the parent with a path")
                .timeout(wait())
                .run(|t| {
                    let ut = Test::new(UNDER_TEST, |ut| {
                        ut.child("Child test under test", |_| Ok(())).run();
                        Ok(())
                    });
                    let t = t.clone();
                    ut.on_status(move |signal| {
                        if signal.path == [0] && signal.status == Status::Passed {
                            t.pass();
                        }
                    });
                    ut.run();
                    Ok(())
                });

            t.test("Which finish before their parent").run(|_| {
                let ut = Test::new(UNDER_TEST, |ut| {
                    ut.child("Child test under test", |_| Ok(())).run();
                    Ok(())
                });
                let seen = Rc::new(RefCell::new(Vec::new()));
                let sink = seen.clone();
                ut.subscribe(Rc::new(move |event: &TestEvent| {
                    let entry = match event {
                        TestEvent::Status(signal) => Some((signal.path.clone(), signal.status)),
                        TestEvent::Finished => None,
                    };
                    sink.borrow_mut().push(entry);
                }));

                ut.run();

                let expected: Vec<Option<(Path, Status)>> = vec![
                    Some((vec![], Status::Running)),
                    Some((vec![0], Status::Running)),
                    Some((vec![0], Status::Passed)),
                    Some((vec![], Status::Passed)),
                    None,
                ];
                assert::deep_equal(&*seen.borrow(), &expected)?;
                Ok(())
            });

            Ok(())
        });

        t.test("Catch errors within the body").run(|_| {
            let ut = Test::new(UNDER_TEST, |_| Err("thrown".into()));
            let failed = Rc::new(Cell::new(false));
            let flag = failed.clone();
            ut.on_status(move |signal| {
                if signal.status == Status::Failed {
                    flag.set(true);
                }
            });

            ut.run();

            assert::ok(failed.get())?;
            Ok(())
        });

        t.test("Catch panics within the body").run(|_| {
            let ut = Test::new(UNDER_TEST, |_| panic!("deliberate"));
            let error = Rc::new(RefCell::new(None));
            let slot = error.clone();
            ut.on_status(move |signal| {
                if signal.status == Status::Failed {
                    *slot.borrow_mut() = signal.error.clone();
                }
            });

            ut.run();

            assert::equal(
                error.borrow().clone(),
                Some(TestError::Panic("deliberate".to_string())),
            )?;
            Ok(())
        });

        t.test("Skip the body").run(|_| {
            let ut = Test::new(UNDER_TEST, |_| Err("should not run".into()));
            let statuses: Rc<RefCell<Vec<Status>>> = Rc::new(RefCell::new(Vec::new()));
            let sink = statuses.clone();
            ut.on_status(move |signal| sink.borrow_mut().push(signal.status));

            let ctx = ut.skip();

            assert::deep_equal(&*statuses.borrow(), &vec![Status::Running, Status::Passed])?;
            assert::ok(ctx.is_finished())?;
            Ok(())
        });

        Ok(())
    })
}
