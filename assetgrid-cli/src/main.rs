//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    assetgrid_cli::init_logging();
    if let Err(err) = assetgrid_cli::run() {
        eprintln!("assetgrid: {err}");
        std::process::exit(1);
    }
}
