use std::process;

use pseudoc_drv::{run, Config};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            process::exit(2);
        }
    };
    if let Err(error) = run(&config) {
        eprintln!("{error}");
        process::exit(1);
    }
}
