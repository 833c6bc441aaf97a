use clap::Parser;
use eloytext_lib::{run, RunOptions};

#[tokio::main]
async fn main() {
    let options = RunOptions::parse();
    if let Err(e) = run(options).await {
        eprintln!("eloytext: {}", e);
        std::process::exit(1);
    }
}
