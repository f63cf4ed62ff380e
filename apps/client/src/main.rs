use clap::Parser;

use learnflow::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    learnflow::run(Args::parse()).await
}
