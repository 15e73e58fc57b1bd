fn main() {
    let code = socg_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
