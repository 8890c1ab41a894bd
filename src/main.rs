fn main() {
    if let Err(err) = research_atlas::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
