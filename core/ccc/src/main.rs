//! ccc binary entry point. See [`ccc_cli`] for the command surface.

mod logging;

use std::io;

fn main() {
    let logging_guard = logging::init();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let code = ccc_cli::run_cli(
        std::env::args_os(),
        &mut input,
        &mut io::stdout(),
        &mut io::stderr(),
    );
    // exit() skips destructors; flush buffered log output first.
    drop(logging_guard);
    std::process::exit(code);
}
