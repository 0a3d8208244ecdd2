use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use zonebot_core::{
    CityResolver, Geocoder, ResolveError, ResolvedCity, TimezoneLocator, canonical_city_name,
    timemath,
};

/// City resolution pipeline: geocode, then timezone-at-point, then
/// offset/abbreviation at the current instant.
///
/// Every failure mode (no geocoding match, uncovered point, transport
/// error) collapses into [`ResolveError::NotFound`]; the caller re-prompts
/// the user and never learns which step failed.
pub struct GeoCityResolver<G, L> {
    geocoder: G,
    locator: L,
}

impl<G, L> GeoCityResolver<G, L> {
    pub const fn new(geocoder: G, locator: L) -> Self {
        Self { geocoder, locator }
    }
}

#[async_trait]
impl<G, L> CityResolver for GeoCityResolver<G, L>
where
    G: Geocoder,
    L: TimezoneLocator,
{
    async fn resolve(&self, text: &str) -> Result<ResolvedCity, ResolveError> {
        let not_found = || ResolveError::NotFound(text.to_string());

        let coords = match self.geocoder.geocode(text).await {
            Ok(Some(coords)) => coords,
            Ok(None) => return Err(not_found()),
            Err(e) => {
                warn!("Geocoding failed for {text:?}: {e}");
                return Err(not_found());
            }
        };

        let timezone = self.locator.timezone_at(coords).ok_or_else(not_found)?;

        let now = Utc::now();
        let city = ResolvedCity {
            query: text.to_string(),
            display_name: canonical_city_name(text),
            timezone,
            utc_offset: timemath::utc_offset(timezone, now),
            abbreviation: timemath::zone_abbreviation(timezone, now),
        };

        info!(
            "Resolved {text:?} to {} ({})",
            city.timezone, city.utc_offset
        );
        Ok(city)
    }
}
