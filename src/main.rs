use std::process::ExitCode;

fn main() -> ExitCode {
    pydoc_md::cli::run()
}
