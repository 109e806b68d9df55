use std::process::ExitCode;

fn main() -> ExitCode {
    iplist::run()
}
