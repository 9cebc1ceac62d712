#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod config;
mod error;
mod fetch;
mod notify;
mod parse;
mod session;
#[cfg(test)]
mod test_support;
mod tracker;

use crate::{config::Config, fetch::Portal, notify::Sink, tracker::PollLoop};

pub use error::Result;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not listen for Ctrl-C, run until killed: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Received Ctrl-C");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    // checked before anything touches the network
    let config = Config::from_env()?;
    log::debug!("{:?}", config.credentials);

    let portal = Portal::new(&config)?;
    let sink = Sink::from_config(&config)?;
    PollLoop::new(portal, sink, config.watched_courses)
        .run(shutdown_signal())
        .await?;
    Ok(())
}
