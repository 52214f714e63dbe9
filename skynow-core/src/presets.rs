//! Built-in city lists.

use crate::model::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityPreset {
    pub name: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl CityPreset {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Quick-pick names, resolved through the geocoder when chosen.
pub const POPULAR_CITIES: &[&str] = &[
    "Yaoundé",
    "Douala",
    "Garoua",
    "Bamenda",
    "Bafoussam",
    "Abidjan",
    "Lagos",
    "Dakar",
    "Nairobi",
    "Le Caire",
    "Johannesburg",
    "Casablanca",
    "Accra",
];

pub const EXPLORE_CITIES: &[CityPreset] = &[
    CityPreset { name: "Yaoundé", country: "Cameroun", lat: 3.848, lon: 11.5021 },
    CityPreset { name: "Douala", country: "Cameroun", lat: 4.0511, lon: 9.7679 },
    CityPreset { name: "Dakar", country: "Sénégal", lat: 14.7167, lon: -17.4677 },
    CityPreset { name: "Abidjan", country: "Côte d'Ivoire", lat: 5.35995, lon: -4.00826 },
    CityPreset { name: "Lagos", country: "Nigeria", lat: 6.5244, lon: 3.3792 },
    CityPreset { name: "Nairobi", country: "Kenya", lat: -1.2921, lon: 36.8219 },
    CityPreset { name: "Accra", country: "Ghana", lat: 5.6037, lon: -0.187 },
    CityPreset { name: "Casablanca", country: "Maroc", lat: 33.5731, lon: -7.5898 },
    CityPreset { name: "Le Caire", country: "Égypte", lat: 30.0444, lon: 31.2357 },
    CityPreset { name: "Johannesburg", country: "Afrique du Sud", lat: -26.2041, lon: 28.0473 },
];

/// The first five explore cities double as the map's popular pins.
pub fn map_cities() -> &'static [CityPreset] {
    &EXPLORE_CITIES[..5]
}
