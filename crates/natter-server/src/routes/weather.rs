//! Weather proxy route.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::weather::WeatherReport;

pub fn router() -> Router<AppState> {
    Router::new().route("/weather/{latitude}/{longitude}", get(report))
}

async fn report(
    State(state): State<AppState>,
    Path((latitude, longitude)): Path<(String, String)>,
) -> Result<Json<WeatherReport>, ApiError> {
    let latitude = parse_coordinate(&latitude)?;
    let longitude = parse_coordinate(&longitude)?;

    Ok(Json(state.weather.report(latitude, longitude).await?))
}

/// Coordinates must be finite numbers; `"NaN"` parses but is not a place.
fn parse_coordinate(raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ApiError::BadRequest("latitude and longitude must be numbers".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("47.2529").unwrap(), 47.2529);
        assert_eq!(parse_coordinate(" -122.4443 ").unwrap(), -122.4443);
        assert!(parse_coordinate("abc").is_err());
        assert!(parse_coordinate("NaN").is_err());
        assert!(parse_coordinate("inf").is_err());
    }
}
