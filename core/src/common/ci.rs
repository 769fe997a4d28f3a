use std::time::{Duration, Instant};

/// Upper bound for a whole stress run before the process is considered hung.
const WATCHDOG: Duration = Duration::from_secs(600);

/// Abort the process if it is still alive after [`WATCHDOG`].
///
/// A lost wakeup in a stress test shows up as a thread spinning forever, this turns it into a
/// failing CI job instead of a stuck one.
pub fn init() {
    _ = std::thread::Builder::new()
        .name(String::from("simple-lockfree-watchdog"))
        .spawn(|| {
            let start_time = Instant::now();
            std::thread::sleep(WATCHDOG);
            let cost = Instant::now().saturating_duration_since(start_time);
            assert!(cost >= WATCHDOG, "CI time consumption less than expected");
            eprintln!("simple-lockfree test run exceeded {WATCHDOG:?}, aborting");
            std::process::exit(-1);
        });
}
