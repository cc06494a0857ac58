use smalltest::cli;

fn main() {
    std::process::exit(cli::run());
}
