//! Prints the capability profile a provider would get.
//!
//! ```text
//! cargo run -p matchwire --example inspect -- sockets
//! cargo run -p matchwire --example inspect -- verbs negotiate 48
//! ```

use matchwire::{ActiveProfile, Config, ProfileSource, SimulatedTransport, ALL_PROFILES};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let Some(provider) = args.next() else {
        for id in ALL_PROFILES {
            println!("{}\n", matchwire::lookup(id));
        }
        return Ok(());
    };

    let mut config = Config::default();
    let mut transport = SimulatedTransport::new(provider);
    if args.next().as_deref() == Some("negotiate") {
        config.profile_source = ProfileSource::Negotiate;
        if let Some(bits) = args.next() {
            transport = transport.with_match_bits(bits.parse()?).with_immediate_source(false);
        }
    }

    let active = ActiveProfile::establish(&config, &transport)?;
    println!("{}", active.profile().report());
    Ok(())
}
