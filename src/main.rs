use clap::Parser;
use fleet_analytics::cli::{run, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("❌ Analysis failed: {}", e);
        std::process::exit(1);
    }
}
