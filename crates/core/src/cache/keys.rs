//! Cache keys for external lookups.

/// Key for a reverse-geocoded country lookup.
///
/// Coordinates are rounded to five decimals (about one metre) so nearby lookups share
/// an entry.
pub fn country_lookup_key(lon: f64, lat: f64) -> String {
    format!("countryLookup:{lon:.5}:{lat:.5}")
}

/// Key for a user profile fetched from the identity provider.
pub fn user_profile_key(user_id: &str) -> String {
    format!("userProfile:{user_id}")
}
