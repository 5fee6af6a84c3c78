//! smcli binary entrypoint.

use smcli::cli::{self, utils::print_error};

fn main() {
    if let Err(e) = cli::run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
