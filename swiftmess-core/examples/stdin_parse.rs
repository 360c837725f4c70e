//! Print the groups of every message read from stdin.
//!
//! Set `RUST_LOG=trace` to follow the tokenizer state by state.

use swiftmess_core::{GroupItems, Tokenizer};
use tracing_subscriber::EnvFilter;

fn main() -> swiftmess_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let stdin = std::io::stdin().lock();
    for (index, groups) in Tokenizer::from_reader(stdin).messages().enumerate() {
        println!("message {}:", index + 1);
        for group in groups? {
            println!("  {}", group);
        }
    }
    Ok(())
}
