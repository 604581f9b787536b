use std::error::Error;
use std::io;

use gapminder::config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::default();
    let output = gapminder::run(&config)?;

    println!("Chart saved to {}", output.display());
    Ok(())
}
