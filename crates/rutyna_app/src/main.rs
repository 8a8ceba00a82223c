mod app;

use app::AppConfig;

fn main() {
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env();
    if let Err(err) = app::run(config) {
        eprintln!("Failed to run rutyna: {err:#}");
        std::process::exit(1);
    }
}
