fn main() {
    setgame_cli::logging::init_logging();
    let args: Vec<String> = std::env::args().collect();
    let code = setgame_cli::run(args, &mut std::io::stdout(), &mut std::io::stderr());
    std::process::exit(code);
}
