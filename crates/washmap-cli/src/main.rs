mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use washmap_api::types::SourceType;
use washmap_app::RecommendMode;
use washmap_core::LatLng;

#[derive(Debug, Parser)]
#[command(name = "washmap")]
#[command(about = "Car-wash locator client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and persist the auth token for later runs.
    Login { username: String, password: String },
    /// Forget the persisted auth token.
    Logout,
    /// Nearest single car wash to a point.
    Nearest(PointArgs),
    /// Car washes around a point, closest first.
    Nearby(PointArgs),
    /// Weather advisory for a point.
    Weather(PointArgs),
    /// Competitor density around a point (requires login).
    Competition {
        #[command(flatten)]
        point: PointArgs,
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Per-county wash counts.
    Counts,
    /// Site recommendations (requires login).
    #[command(subcommand)]
    Recommend(RecommendCommand),
    /// Saved recommendations (requires login).
    #[command(subcommand)]
    Saved(SavedCommand),
    /// Simulate a map click through the full interaction machine.
    Click {
        #[command(flatten)]
        point: PointArgs,
        /// Enter business mode first (requires login).
        #[arg(long)]
        business: bool,
        /// Business tool to select before the click.
        #[arg(long, value_enum)]
        tool: Option<Tool>,
    },
}

#[derive(Debug, Subcommand)]
enum RecommendCommand {
    /// Candidates inside a circle around a point.
    Circle {
        #[command(flatten)]
        point: PointArgs,
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Candidates inside a county, by stable county identifier.
    County { county_id: String },
    /// Best candidate inside a polygon given as `lat,lng` vertices in order.
    Polygon {
        #[arg(required = true, num_args = 3..)]
        points: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum SavedCommand {
    List,
    Save {
        lat: f64,
        lng: f64,
        #[arg(long, value_enum)]
        source: Source,
        #[arg(long, default_value = "")]
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tool {
    County,
    Circle,
}

impl From<Tool> for RecommendMode {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::County => RecommendMode::County,
            Tool::Circle => RecommendMode::Circle,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    County,
    Circle,
    Polygon,
}

impl From<Source> for SourceType {
    fn from(source: Source) -> Self {
        match source {
            Source::County => SourceType::County,
            Source::Circle => SourceType::Circle,
            Source::Polygon => SourceType::Polygon,
        }
    }
}

#[derive(Debug, Args)]
struct PointArgs {
    lat: f64,
    lng: f64,
}

impl PointArgs {
    fn to_point(&self) -> anyhow::Result<LatLng> {
        Ok(LatLng::new(self.lat, self.lng)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = washmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Login { username, password } => {
            commands::run_login(&config, &username, &password).await
        }
        Commands::Logout => commands::run_logout(&config),
        Commands::Nearest(point) => commands::run_nearest(&config, point.to_point()?).await,
        Commands::Nearby(point) => commands::run_nearby(&config, point.to_point()?).await,
        Commands::Weather(point) => commands::run_weather(&config, point.to_point()?).await,
        Commands::Competition { point, radius_km } => {
            let radius_km = radius_km.unwrap_or(config.default_competition_radius_km);
            commands::run_competition(&config, point.to_point()?, radius_km).await
        }
        Commands::Counts => commands::run_counts(&config).await,
        Commands::Recommend(RecommendCommand::Circle { point, radius_km }) => {
            let radius_km = radius_km.unwrap_or(config.default_radius_km);
            commands::run_recommend_circle(&config, point.to_point()?, radius_km).await
        }
        Commands::Recommend(RecommendCommand::County { county_id }) => {
            commands::run_recommend_county(&config, &county_id).await
        }
        Commands::Recommend(RecommendCommand::Polygon { points }) => {
            commands::run_recommend_polygon(&config, &points).await
        }
        Commands::Saved(SavedCommand::List) => commands::run_saved_list(&config).await,
        Commands::Saved(SavedCommand::Save {
            lat,
            lng,
            source,
            reason,
        }) => commands::run_saved_save(&config, lat, lng, source.into(), reason).await,
        Commands::Click {
            point,
            business,
            tool,
        } => {
            commands::run_click(
                &config,
                point.to_point()?,
                business,
                tool.map(RecommendMode::from),
            )
            .await
        }
    }
}
