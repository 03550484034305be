use std::process::ExitCode;

fn main() -> ExitCode {
    reorder_cli::run()
}
