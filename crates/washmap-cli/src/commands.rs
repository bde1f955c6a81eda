//! Command handlers for the washmap CLI.
//!
//! Each handler builds its own client from the config, attaching the
//! persisted auth token when one exists, runs a single request (or, for
//! `click`, a full session event) and prints the outcome.

use washmap_api::types::{
    RecommendParams, RecommendationCandidate, SaveRecommendationRequest, SourceType,
};
use washmap_api::{TokenStore, WashmapClient};
use washmap_app::{BusinessParams, Mode, RecommendMode, Session};
use washmap_core::{AppConfig, LatLng, Notice};

fn token_store(config: &AppConfig) -> TokenStore {
    TokenStore::new(config.token_path.clone())
}

fn build_client(config: &AppConfig) -> anyhow::Result<WashmapClient> {
    let mut client = WashmapClient::new(
        &config.base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    if let Some(token) = token_store(config).load()? {
        client.set_auth_token(Some(token));
    }
    Ok(client)
}

fn business_params(config: &AppConfig) -> BusinessParams {
    BusinessParams {
        radius_km: config.default_radius_km,
        min_distance_km: config.default_min_distance_km,
        max_settlement_distance_km: config.default_max_settlement_distance_km,
        competition_radius_km: config.default_competition_radius_km,
    }
}

fn recommend_params(config: &AppConfig) -> RecommendParams {
    RecommendParams {
        min_distance_km: config.default_min_distance_km,
        max_settlement_distance_km: config.default_max_settlement_distance_km,
    }
}

/// The service only accepts mutating requests that echo its csrftoken
/// cookie; any prior GET makes it set one. The saved-recommendations list is
/// the natural choice since every POST here is an authenticated business
/// flow.
async fn prime_csrf(client: &WashmapClient) -> anyhow::Result<()> {
    client.saved_recommendations().await?;
    Ok(())
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("{notice}");
    }
}

fn print_candidates(candidates: &[RecommendationCandidate]) {
    if candidates.is_empty() {
        println!("no suitable locations found");
        return;
    }
    for (rank, c) in candidates.iter().enumerate() {
        let name = c.name.as_deref().unwrap_or("(unnamed)");
        println!("{}. {name} at ({:.6}, {:.6})", rank + 1, c.lat, c.lng);
        if let Some(population) = c.population {
            println!("   population {population}");
        }
        if let Some(km) = c.min_distance_to_carwash_km {
            println!("   nearest existing car wash {km:.1} km");
        }
        if !c.reason.is_empty() {
            println!("   {}", c.reason);
        }
    }
}

pub(crate) async fn run_login(
    config: &AppConfig,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let mut client = build_client(config)?;
    let response = client.login(username, password).await?;
    token_store(config).save(&response.token)?;
    let who = response.user.map_or_else(|| username.to_owned(), |u| u.username);
    println!("logged in as {who}");
    Ok(())
}

pub(crate) fn run_logout(config: &AppConfig) -> anyhow::Result<()> {
    token_store(config).clear()?;
    println!("logged out");
    Ok(())
}

pub(crate) async fn run_nearest(config: &AppConfig, point: LatLng) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let response = client.nearest(point).await?;
    match response.location {
        Some(wash) => {
            let name = wash.name.as_deref().unwrap_or("(unnamed)");
            println!("{name} at ({:.6}, {:.6})", wash.lat, wash.lng);
            if let Some(address) = wash.address.as_deref() {
                println!("  {address}");
            }
            if let Some(km) = response.distance {
                println!("  {km:.1} km away");
            }
        }
        None => println!("no car wash found"),
    }
    Ok(())
}

pub(crate) async fn run_nearby(config: &AppConfig, point: LatLng) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let washes = client.nearby(point).await?;
    if washes.is_empty() {
        println!("no car washes nearby");
    }
    for wash in washes {
        let name = wash.name.as_deref().unwrap_or("(unnamed)");
        println!("{name} — {:.1} km", wash.distance_km);
    }
    Ok(())
}

pub(crate) async fn run_weather(config: &AppConfig, point: LatLng) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let weather = client.weather(point).await?;
    println!("{:.1}°C, {}", weather.temp, weather.description);
    if weather.good_for_wash {
        println!("good day for a wash");
    } else {
        println!("not a great day for a wash");
    }
    Ok(())
}

pub(crate) async fn run_competition(
    config: &AppConfig,
    point: LatLng,
    radius_km: f64,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let competition = client.competition(point, radius_km).await?;
    println!(
        "{} competitors within {} km — {:?} saturation",
        competition.competitor_count, competition.radius_km, competition.saturation_level
    );
    Ok(())
}

pub(crate) async fn run_counts(config: &AppConfig) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let counts = client.fetch_wash_counts().await?;
    for county in counts {
        println!("{}: {}", county.name, county.wash_count);
    }
    Ok(())
}

pub(crate) async fn run_recommend_circle(
    config: &AppConfig,
    center: LatLng,
    radius_km: f64,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let candidates = client
        .recommend_circle(center, radius_km, recommend_params(config))
        .await?;
    print_candidates(&candidates);
    Ok(())
}

pub(crate) async fn run_recommend_county(
    config: &AppConfig,
    county_id: &str,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let candidates = client
        .recommend_county(county_id, recommend_params(config))
        .await?;
    print_candidates(&candidates);
    Ok(())
}

pub(crate) async fn run_recommend_polygon(
    config: &AppConfig,
    points: &[String],
) -> anyhow::Result<()> {
    let mut ring: Vec<Vec<f64>> = Vec::with_capacity(points.len() + 1);
    for raw in points {
        ring.push(parse_vertex(raw)?.to_geojson_position());
    }
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }

    let client = build_client(config)?;
    prime_csrf(&client).await?;
    let candidate = client
        .recommend_polygon(ring, config.default_min_distance_km)
        .await?;
    print_candidates(std::slice::from_ref(&candidate));
    Ok(())
}

pub(crate) async fn run_saved_list(config: &AppConfig) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let saved = client.saved_recommendations().await?;
    if saved.is_empty() {
        println!("no saved recommendations");
    }
    for item in saved {
        println!(
            "{} {} ({:.6}, {:.6}): {}",
            item.created_at.format("%Y-%m-%d %H:%M"),
            item.source_type,
            item.lat,
            item.lng,
            item.reason
        );
    }
    Ok(())
}

pub(crate) async fn run_saved_save(
    config: &AppConfig,
    lat: f64,
    lng: f64,
    source_type: SourceType,
    reason: String,
) -> anyhow::Result<()> {
    // Range-check through the same validation every other point gets.
    let point = LatLng::new(lat, lng)?;
    let client = build_client(config)?;
    prime_csrf(&client).await?;
    let saved = client
        .save_recommendation(&SaveRecommendationRequest {
            lat: point.lat,
            lng: point.lng,
            source_type,
            reason,
        })
        .await?;
    let id = saved
        .id
        .map_or_else(|| "(no id)".to_owned(), |id| id.to_string());
    println!("saved recommendation {id}");
    Ok(())
}

pub(crate) async fn run_click(
    config: &AppConfig,
    point: LatLng,
    business: bool,
    tool: Option<RecommendMode>,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let mut session = Session::new(client, business_params(config));

    if business {
        print_notices(&session.set_mode(Mode::Business).await);
        if session.state.mode != Mode::Business {
            return Ok(());
        }
        if let Some(tool) = tool {
            session.state.set_recommend_mode(tool);
        }
    }

    print_notices(&session.click(point).await);

    for wash in &session.state.nearby {
        let name = wash.name.as_deref().unwrap_or("(unnamed)");
        println!("{name} — {:.1} km", wash.distance_km);
    }
    if let Some(rec) = session.state.recommendations.last() {
        let name = rec.name.as_deref().unwrap_or("(unnamed)");
        println!("recommended: {name} at ({:.6}, {:.6})", rec.lat, rec.lng);
        if !rec.reason.is_empty() {
            println!("  {}", rec.reason);
        }
    }
    Ok(())
}

fn parse_vertex(raw: &str) -> anyhow::Result<LatLng> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected 'lat,lng', got '{raw}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid latitude in '{raw}'"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid longitude in '{raw}'"))?;
    Ok(LatLng::new(lat, lng)?)
}
