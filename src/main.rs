fn main() {
    if let Err(err) = tripglobe_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
