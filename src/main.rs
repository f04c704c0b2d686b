fn main() -> std::process::ExitCode {
    safarivideos_lib::run()
}
