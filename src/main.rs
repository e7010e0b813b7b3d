use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Small HTTP server built around a fallback-tree router")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:4221")]
    addr: String,

    /// Base directory for the /files routes. File serving is disabled
    /// when absent.
    #[arg(long)]
    directory: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    trellis_http::run(&args.addr, args.directory);
}
