use std::sync::Arc;

use foodbot::{
    config::Config,
    kiosk::{
        HttpKioskApi, KioskController, KioskEvent, KioskRuntime, TerminalDisplay, input,
    },
    telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!("Kiosk backend: {}", config.kiosk.base_url);

    let api = HttpKioskApi::new(&config.kiosk.base_url)?;
    let controller = KioskController::new(
        api,
        Arc::new(TerminalDisplay::new()),
        config.kiosk.status_display(),
    );
    let (runtime, handle) = KioskRuntime::new(
        controller,
        config.kiosk.rfid_interval(),
        config.kiosk.menu_interval(),
    );
    let kiosk = tokio::spawn(runtime.run());

    println!("{}", input::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await? {
        match input::parse_command(&line) {
            Some(KioskEvent::Shutdown) => {
                quit = true;
                break;
            }
            Some(event) => handle.send(event).await?,
            None if line.trim().is_empty() => {}
            None => println!("{}", input::HELP),
        }
    }

    // Without a terminal the kiosk keeps scanning until interrupted.
    if !quit {
        tracing::info!("No operator input, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
    }

    handle.shutdown().await?;
    kiosk.await?;
    Ok(())
}
