fn main() {
    if let Err(e) = ssdi::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
