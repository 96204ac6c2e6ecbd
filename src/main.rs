use std::{env, sync::Arc};

use log::{error, info};
use teloxide::prelude::*;
use tokio::{
    sync::Mutex,
    time::{interval, Duration},
};

mod bot_commands;
mod bot_logic;
mod database;
mod endpoints;
mod error;
mod formatter;
mod parser;
mod types;
mod validator;
mod wizard;

use crate::bot_commands::dispatch_handler;
use crate::database::sqlite::SqliteDatabase;
use crate::wizard::{DebtWorkflow, ProcessGuard};

const DATABASE_PATH_VAR: &str = "DEBTS_DB_PATH";
const DEFAULT_DATABASE_PATH: &str = "debts.db";

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    spawn_background_health_log();

    let database_path =
        env::var(DATABASE_PATH_VAR).unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

    info!("Initializing database at {database_path}...");
    let database = SqliteDatabase::new(&database_path)
        .map_err(|e| error!("Cannot initialize database: {}", e))
        .expect("Cannot initialize database");

    let database = Arc::new(Mutex::new(database));
    let workflow = Arc::new(Mutex::new(DebtWorkflow::default()));
    let guard = Arc::new(Mutex::new(ProcessGuard::default()));

    info!("Starting command bot...");

    let bot = Bot::from_env();

    Dispatcher::builder(bot, dispatch_handler())
        .dependencies(dptree::deps![database, workflow, guard])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// WORKAROUND: This is an attempt at preventing the OS from killing the bot
/// after a while when it is inactive for too long.
fn spawn_background_health_log() {
    tokio::spawn(async {
        // Create an interval timer that ticks every 3 hours.
        let mut interval = interval(Duration::from_secs(3 * 60 * 60));

        loop {
            interval.tick().await;
            info!("Bot is healthy");
        }
    });
}
