fn main() {
    if let Err(err) = orgchart_rs::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
