#[macro_use]
extern crate tracing;

mod config;
mod model;
mod plugin;
mod store;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use onebot::bot::Bot;

use crate::{
    config::Config,
    plugin::{
        DriftBottle,
        drift_bottle::{HttpLookup, IdentityLookup, Renderer},
        drift_bottle_plugin,
    },
    store::BottleStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::load()?;

    let mut bot_instance = Bot::connect(&config.bot.address).await?;
    bot_instance.use_builtin_handler();
    if config.plugin.enabled {
        let store = Arc::new(BottleStore::open(&config.database.path)?);
        info!(path = %config.database.path, unclaimed = store.unclaimed_count()?, "Bottle store opened");
        let lookup = config
            .identity
            .endpoint
            .as_deref()
            .map(|endpoint| Arc::new(HttpLookup::new(endpoint)) as Arc<dyn IdentityLookup>);
        bot_instance.register_plugin(drift_bottle_plugin(DriftBottle::new(
            store,
            config.command_matcher()?,
            Renderer::new(config.template.clone()),
            lookup,
        )));
    } else {
        warn!("Drift bottle plugin is disabled");
    }

    tokio::select! {
        res = bot_instance.start() => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    }
}
