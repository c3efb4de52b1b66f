fn main() {
    if let Err(err) = csv_schema_infer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
