use std::env;

use hateful_strike::cli;

fn main() {
    std::process::exit(cli::run_with_args(env::args_os()));
}
