//! deptree - dependency-aware ordering for interdependent items

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = deptree::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
