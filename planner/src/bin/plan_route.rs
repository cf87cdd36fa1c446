// Runs one route computation against the live directions service.
// Usage: AZURE_MAPS_KEY=... cargo run --bin plan_route -- --origin 47.6,-122.3 --waypoint 47.7,-122.2

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::Parser;
    use planner::{HttpDirectionsClient, RouteState, ServiceConfig, calculate_route};
    use shared::{Location, TravelOptionsUpdate, VehicleKind};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    #[derive(Parser, Debug)]
    #[command(about = "Compute an optimized multi-stop route")]
    struct Args {
        /// Start point as lat,lon
        #[arg(long, value_parser = parse_location)]
        origin: Location,
        /// Stop as lat,lon (repeatable, visiting order is optimized)
        #[arg(long = "waypoint", value_parser = parse_location, required = true)]
        waypoints: Vec<Location>,
        /// Route as a truck with nominal dimensions
        #[arg(long)]
        truck: bool,
        /// Use live traffic
        #[arg(long)]
        traffic: bool,
    }

    fn parse_location(raw: &str) -> Result<Location, String> {
        let (lat, lon) = raw
            .split_once(',')
            .ok_or_else(|| format!("expected lat,lon, got {raw:?}"))?;
        let parse = |value: &str, label: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid {label} in {raw:?}"))
        };
        Ok(Location::new(parse(lat, "latitude")?, parse(lon, "longitude")?))
    }

    #[tokio::main]
    pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "planner=debug,plan_route=info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();

        let args = Args::parse();
        let config = ServiceConfig::from_env()?;
        tracing::info!("using directions service at {}", config.base_url());
        let client = HttpDirectionsClient::new(config)?;

        let mut state = RouteState::new();
        state.set_origin(args.origin);
        for waypoint in args.waypoints {
            state.add_waypoint(waypoint);
        }
        state.set_travel_options(TravelOptionsUpdate {
            traffic_enabled: Some(args.traffic),
            vehicle_kind: Some(if args.truck {
                VehicleKind::Truck
            } else {
                VehicleKind::Car
            }),
        });

        calculate_route(&mut state, &client).await?;

        if let Some(error) = state.last_error() {
            return Err(error.into());
        }
        if let Some(result) = state.last_result() {
            println!(
                "{:.2} km, {:.0} min",
                result.total_distance_km, result.total_duration_min
            );
            if let Some(order) = &result.optimized_order {
                let order: Vec<String> = order.iter().map(|idx| (idx + 1).to_string()).collect();
                println!("visiting order: {}", order.join(" -> "));
            }
            for leg in &result.legs {
                println!(
                    "  {} -> {}: {:.2} km, {:.0} min",
                    leg.start_label, leg.end_label, leg.distance_km, leg.duration_min
                );
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_location() {
            assert_eq!(parse_location("47.6, -122.3"), Ok(Location::new(47.6, -122.3)));
            assert!(parse_location("47.6").is_err());
            assert!(parse_location("north,-122.3").is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
