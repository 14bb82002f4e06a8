fn main() {
    if let Err(err) = portcullis::run() {
        eprintln!("portcullis: {err}");
        std::process::exit(1);
    }
}
