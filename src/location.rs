use thiserror::Error;

pub const MIN_QUERY_LEN: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Please enter a valid city name")]
    Blank,
    #[error("Please enter at least 2 characters")]
    TooShort,
    #[error("Invalid latitude: {0}. Must be between -90 and 90")]
    InvalidLatitude(f64),
    #[error("Invalid longitude: {0}. Must be between -180 and 180")]
    InvalidLongitude(f64),
    #[error("Latitude is required when longitude is given")]
    MissingLatitude,
    #[error("Longitude is required when latitude is given")]
    MissingLongitude,
}

/// Cache key for a location query: lowercased, spaces replaced by underscores.
///
/// Idempotent, so `"New York"`, `"NEW YORK"` and `"new_york"` share one entry.
pub fn normalize_location_key(query: &str) -> String {
    query.to_lowercase().replace(' ', "_")
}

pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), LocationError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(LocationError::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(LocationError::InvalidLongitude(lon));
    }
    Ok(())
}

/// A validated location query: either `"<lat>,<lon>"` or a place name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Accepts user-entered text. Surrounding whitespace is dropped.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LocationError::Blank);
        }
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Err(LocationError::TooShort);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_coordinates(lat: f64, lon: f64) -> Result<Self, LocationError> {
        validate_coordinates(lat, lon)?;
        Ok(Self(format!("{},{}", lat, lon)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
