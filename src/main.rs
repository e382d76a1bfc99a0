// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(
    all(feature = "desktop", not(debug_assertions)),
    windows_subsystem = "windows"
)]

#[cfg(feature = "desktop")]
fn main() {
    florasoul_lib::run()
}

#[cfg(not(feature = "desktop"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;

    florasoul_lib::init_logging();
    let options = florasoul_lib::headless::HeadlessOptions::parse();
    florasoul_lib::headless::run(options).await
}
