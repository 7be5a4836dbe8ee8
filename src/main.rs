//! samplebuild CLI entry point

fn main() {
    samplebuild::cli::run();
}
