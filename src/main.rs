//! mactl binary entry point.

use mactl::ui::output::{self, Verbosity};

fn main() {
    if let Err(err) = mactl::process::interrupt::install() {
        output::warn(format!("cannot watch for interrupts: {err}"), Verbosity::Normal);
    }
    std::process::exit(mactl::cli::run());
}
