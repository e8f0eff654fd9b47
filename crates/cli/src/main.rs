use std::process::ExitCode;

fn main() -> ExitCode {
    quotebook_cli::run()
}
