mod telegram;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

use std::env;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use eyre::{eyre, Result, WrapErr};
use structopt::StructOpt;

use acbridge_core::ac::AcState;
use acbridge_core::dispatch::{CommandRecord, Dispatcher, Reply};
use acbridge_core::store::{FileStore, StateStore};
use acbridge_peripherals::dht::Dht11;
use acbridge_peripherals::ir::IrOut;

use crate::telegram::Telegram;

const STARTED_TEXT: &str = "<b>Я запустился!</b>";

const POLL_RETRY: Duration = Duration::from_secs(5);

#[derive(StructOpt, Debug)]
struct Opt {
    /// Bot API token
    #[structopt(long, env = "BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Chat id of the single authorized operator
    #[structopt(long, env = "ADMIN_CHAT")]
    admin_chat: String,

    /// Where the ac state is persisted
    #[structopt(long, default_value = "acstate.json")]
    state_file: PathBuf,

    /// Gpio pin of the ir transmitter
    #[structopt(long, default_value = "4")]
    ir_pin: u8,

    /// Gpio pin of the climate sensor
    #[structopt(long, default_value = "12")]
    dht_pin: u8,

    /// Long poll timeout in seconds
    #[structopt(long, default_value = "30")]
    poll_timeout: u64,

    /// Power the ac on at startup
    #[structopt(long)]
    power_on_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;

    let opt = Opt::from_args();
    debug!("opts: {:?}", opt);

    let admin_id: i64 = opt
        .admin_chat
        .parse()
        .wrap_err("ADMIN_CHAT must be a numeric chat id")?;

    let store = FileStore::new(&opt.state_file);
    let state = match store.load() {
        Ok(Some(record)) => record.restore(opt.power_on_start),
        Ok(None) => AcState::new(opt.power_on_start),
        Err(e) => {
            warn!("could not load persisted state, using defaults: {}", e);
            AcState::new(opt.power_on_start)
        }
    };
    info!("starting with state: {:?}", state);

    let actuator = IrOut::new(opt.ir_pin)?;
    let sensor = Dht11::new(opt.dht_pin)?;
    let mut dispatcher = Dispatcher::new(state, opt.admin_chat.clone(), actuator, sensor, store);

    let telegram = Telegram::new(&opt.token);
    if let Err(e) = telegram.send_message(admin_id, STARTED_TEXT).await {
        warn!("could not announce startup: {}", e);
    }

    let mut offset: i64 = 0;
    loop {
        let updates = match telegram.get_updates(offset, opt.poll_timeout).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("could not poll updates: {}", e);
                tokio::time::sleep(POLL_RETRY).await;
                continue;
            }
        };

        for update in updates {
            offset = update.update_id + 1;
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };
            let from_name = message
                .from
                .map(|u| u.first_name)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Guest".to_string());

            let record = CommandRecord {
                sender: message.chat.id.to_string(),
                from_name,
                text,
            };
            let reply = dispatcher.dispatch(&record);
            let restart = matches!(reply, Reply::Restart);

            let sent = if reply.with_keyboard() {
                telegram
                    .send_message_with_keyboard(message.chat.id, &reply.text())
                    .await
            } else {
                telegram.send_message(message.chat.id, &reply.text()).await
            };
            if let Err(e) = sent {
                warn!("could not send reply: {}", e);
            }

            if restart {
                // commit the offset so the restart command is not redelivered
                if let Err(e) = telegram.get_updates(offset, 0).await {
                    warn!("could not commit update offset before restart: {}", e);
                }
                return Err(restart_process());
            }
        }
    }
}

/// Replaces the running process with a fresh copy of itself; state is
/// rebuilt from the persisted record as on any boot. Only returns on
/// failure.
fn restart_process() -> eyre::Report {
    info!("restarting");
    let exe = match env::current_exe() {
        Ok(exe) => exe,
        Err(e) => return eyre!("could not resolve own executable: {}", e),
    };
    let err = process::Command::new(exe).args(env::args_os().skip(1)).exec();
    eyre!("could not restart: {}", err)
}
