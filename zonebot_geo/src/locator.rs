use chrono_tz::Tz;
use tracing::warn;
use tzf_rs::DefaultFinder;
use zonebot_core::{Coordinates, TimezoneLocator};

/// Point-in-polygon timezone lookup over the bundled tzf dataset.
///
/// Construction deserializes the polygon data, so build one finder at
/// startup and share it.
pub struct TzfLocator {
    finder: DefaultFinder,
}

impl TzfLocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for TzfLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneLocator for TzfLocator {
    fn timezone_at(&self, coords: Coordinates) -> Option<Tz> {
        let name = self.finder.get_tz_name(coords.longitude, coords.latitude);
        if name.is_empty() {
            return None;
        }
        match name.parse() {
            Ok(tz) => Some(tz),
            Err(_) => {
                // tzf data can be newer than the chrono-tz table.
                warn!("tzf returned unknown zone id {name:?}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_city_coordinates_resolve() {
        let locator = TzfLocator::new();
        let paris = Coordinates {
            latitude: 48.8566,
            longitude: 2.3522,
        };
        assert_eq!(locator.timezone_at(paris), Some(chrono_tz::Europe::Paris));
    }

    #[test]
    fn open_ocean_has_etc_or_no_zone() {
        let locator = TzfLocator::new();
        let south_pacific = Coordinates {
            latitude: -48.0,
            longitude: -123.0,
        };
        // tzf maps open ocean to Etc/GMT* zones; either way it must not panic.
        let _ = locator.timezone_at(south_pacific);
    }
}
