use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use dlhook::abi::{INIT_MESSAGE, RUN_MESSAGE};
use dlhook::{HookError, LoadableUnit, RecordingSink};

#[test]
fn recorded_log_after_load_and_two_runs() {
    let unit = LoadableUnit::load(RecordingSink::new()).unwrap();
    assert_eq!(unit.sink().messages(), vec!["init() called inside blort."]);

    unit.run().unwrap();
    unit.run().unwrap();
    assert_eq!(
        unit.sink().messages(),
        vec![
            "init() called inside blort.",
            "run() called inside blort.",
            "run() called inside blort.",
        ]
    );
}

#[test]
fn first_invocation_failure_fails_the_load() {
    let calls = AtomicUsize::new(0);
    let result = LoadableUnit::load(|_: &str| -> Result<(), HookError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(HookError::new("host refused"))
    });

    assert_eq!(result.err(), Some(HookError::new("host refused")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_runs_each_deliver_one_message() {
    let unit = Arc::new(LoadableUnit::load(RecordingSink::new()).unwrap());

    let workers = (0..4)
        .map(|_| {
            let unit = Arc::clone(&unit);
            thread::spawn(move || {
                for _ in 0..25 {
                    unit.run().unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        worker.join().unwrap();
    }

    let messages = unit.sink().messages();
    assert_eq!(messages.len(), 101);
    assert_eq!(messages[0], INIT_MESSAGE);
    assert_eq!(messages.iter().filter(|m| *m == RUN_MESSAGE).count(), 100);
}
