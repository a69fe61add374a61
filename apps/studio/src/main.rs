use anyhow::Result;
use eframe::NativeOptions;
use tracing_subscriber::EnvFilter;

mod app;
mod session;
mod timeline;

use app::App;

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let options = NativeOptions::default();
    eframe::run_native(
        "Showcase Studio",
        options,
        Box::new(|_cc| Ok(Box::new(App::new()))),
    )
    .map_err(|err| anyhow::anyhow!("ui loop exited with error: {err}"))?;
    Ok(())
}
