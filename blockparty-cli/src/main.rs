//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = blockparty_cli::run() {
        eprintln!("blockparty: {err}");
        std::process::exit(1);
    }
}
