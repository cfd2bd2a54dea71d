use std::process;

fn main() {
    spendlog::init();

    if let Err(err) = spendlog::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
