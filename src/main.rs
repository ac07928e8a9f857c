fn main() {
    let code = pylaunch::run_cli();
    if code != 0 {
        std::process::exit(code);
    }
}
