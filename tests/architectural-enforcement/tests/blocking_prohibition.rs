//! Integration Test: Blocking Prohibition
//!
//! **Policy**: production code never blocks the runtime.
//! - No `std::thread::sleep`
//! - No `reqwest::blocking`
//! - `tokio::time::sleep` only for a named delay or reconnect backoff,
//!   never as polling

use architectural_enforcement::{assert_none, find, production_lines, SourceLine};

const DIRS: [&str; 2] = ["core/src", "tui/src"];

#[test]
fn test_no_thread_sleep() {
    for dir in DIRS {
        let lines = production_lines(dir);
        assert_none(
            "thread::sleep in production code",
            &find(&lines, &["thread::sleep"]),
        );
    }
}

#[test]
fn test_no_blocking_http() {
    for dir in DIRS {
        let lines = production_lines(dir);
        assert_none(
            "blocking HTTP client in production code",
            &find(&lines, &["reqwest::blocking"]),
        );
    }
}

#[test]
fn test_async_sleep_only_for_delays_and_backoff() {
    for dir in DIRS {
        let lines = production_lines(dir);
        let violations: Vec<&SourceLine> = find(&lines, &["time::sleep("])
            .into_iter()
            .filter(|line| {
                let code = line.code.to_lowercase();
                !code.contains("backoff") && !code.contains("delay")
            })
            .collect();
        assert_none("sleep used outside a delay or backoff", &violations);
    }
}
