#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = panview::run_from_env() {
        eprintln!("panview: {error}");
        std::process::exit(error.exit_code());
    }
}
