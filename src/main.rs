use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;
use wintersky::app::App;
use wintersky::app_state::{AppState, Overrides};
use wintersky::celestial::LocalTime;
use wintersky::config::Config;
use wintersky::render::TerminalRenderer;
use wintersky::weather::WeatherCondition;

const LOG_ENV: &str = "WINTERSKY_LOG";

#[derive(Parser)]
#[command(version, about = "Animated winter sky for the terminal", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "CONDITION",
        help = "Simulate weather condition (clear, partly-cloudy, overcast, drizzle, rain, heavy-rain, snow)"
    )]
    simulate: Option<WeatherCondition>,

    #[arg(short, long, help = "Force night sky (moon and stars)")]
    night: bool,

    #[arg(long, help = "Hide the ground, tree, sleigh and snow plow")]
    no_holiday: bool,

    #[arg(short, long, help = "Let the wind gust around its reported strength")]
    gusting: bool,

    #[arg(long, value_name = "SEED", help = "Seed for runtime randomness")]
    seed: Option<u32>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config ({}): {}", e.kind(), e);
            eprintln!("\nContinuing with default settings.");
            eprintln!("\nTo customize, create a config file at:");
            eprintln!("  $XDG_CONFIG_HOME/wintersky/config.toml");
            eprintln!("  or ~/.config/wintersky/config.toml");
            eprintln!("\nExample config.toml:");
            eprintln!("  [weather]");
            eprintln!("  code = 73");
            eprintln!("  wind_speed = 18.0");
            eprintln!();
            Config::default()
        }
    };

    let Some(mut renderer) = TerminalRenderer::new()? else {
        tracing::info!("stdout is not a terminal, nothing to draw on");
        return Ok(());
    };

    let overrides = Overrides {
        simulate: cli.simulate,
        night: cli.night,
        no_holiday: cli.no_holiday,
        gusting: cli.gusting,
        seed: cli.seed,
    };
    let state = AppState::new(
        &config,
        &overrides,
        LocalTime::now(config.sky.utc_offset_hours),
    );

    renderer.init()?;

    let (term_width, term_height) = renderer.get_size();
    let mut app = App::new(state, config.scene.fps, term_width, term_height);

    let result = app.run(&mut renderer).await;

    renderer.cleanup()?;

    result
}
