//! Seed command implementation.

use chrono::{DateTime, Duration, Utc};

use slackmap::storage::DynamoDbStorage;
use slackmap::SlackmapRepository;
use slackmap_core::entities::{
    changelog_timestamp, ChangelogAction, ChangelogAttrs, ChangelogKeys, CountryInfo,
    CountryInfoAttrs, CountryKeys, DetailsKeys, EditorAttrs, EditorKeys, EditorType,
    FeatureChangelog, FeatureEditor, FeatureType, GuideDetails, GuideDetailsAttrs, LineDetails,
    LineDetailsAttrs, SpotDetails, SpotDetailsAttrs,
};
use slackmap_core::transform::Entity;

use super::error::Result;

/// Everything one seed run writes.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub country: CountryInfo,
    pub lines: Vec<LineDetails>,
    pub spots: Vec<SpotDetails>,
    pub guides: Vec<GuideDetails>,
    pub editors: Vec<FeatureEditor>,
    pub changelogs: Vec<FeatureChangelog>,
}

impl SeedData {
    pub fn item_count(&self) -> usize {
        1 + self.lines.len()
            + self.spots.len()
            + self.guides.len()
            + self.editors.len()
            + self.changelogs.len()
    }
}

const LINE_NAMES: [&str; 5] = [
    "Gorge Crossing",
    "Old Quarry",
    "Riverside Longline",
    "Twin Pines",
    "Castle Rock",
];
const LINE_TYPES: [&str; 3] = ["highline", "waterline", "midline"];

/// Generate a country with `count` lines, spots and guides, each owned by `user_id`
/// and carrying a creation changelog.
pub fn generate_seed_data(
    country_code: &str,
    country_name: &str,
    user_id: &str,
    count: u32,
    now: DateTime<Utc>,
) -> SeedData {
    let mut data = SeedData {
        country: Entity::new(
            CountryKeys::new(country_code),
            CountryInfoAttrs {
                name: country_name.to_string(),
                line_count: count,
                spot_count: count,
                guide_count: count,
                updated_at: Some(now),
            },
        ),
        lines: Vec::new(),
        spots: Vec::new(),
        guides: Vec::new(),
        editors: Vec::new(),
        changelogs: Vec::new(),
    };

    for i in 0..count {
        let created = now - Duration::days(i64::from(count - i));
        let anchor = [19.9 + f64::from(i) * 0.01, 49.2 + f64::from(i) * 0.01];

        for feature_type in FeatureType::ALL {
            let feature_id = format!("{}-{}-{}", country_code, feature_type, i + 1);
            let keys = DetailsKeys::new(&feature_id).with_country(country_code);

            match feature_type {
                FeatureType::Line => data.lines.push(Entity::new(
                    keys,
                    LineDetailsAttrs {
                        name: LINE_NAMES[i as usize % LINE_NAMES.len()].to_string(),
                        description: String::new(),
                        line_type: LINE_TYPES[i as usize % LINE_TYPES.len()].to_string(),
                        length: Some(40.0 + f64::from(i) * 15.0),
                        height: Some(10.0 + f64::from(i) * 5.0),
                        coordinates: vec![anchor, [anchor[0] + 0.001, anchor[1]]],
                        creator_user_id: user_id.to_string(),
                        created_date_time: created,
                    },
                )),
                FeatureType::Spot => data.spots.push(Entity::new(
                    keys,
                    SpotDetailsAttrs {
                        name: format!("Spot {}", i + 1),
                        description: String::new(),
                        coordinates: vec![anchor],
                        creator_user_id: user_id.to_string(),
                        created_date_time: created,
                    },
                )),
                FeatureType::Guide => data.guides.push(Entity::new(
                    keys,
                    GuideDetailsAttrs {
                        guide_type: "parkingSpot".to_string(),
                        description: format!("Parking for spot {}", i + 1),
                        coordinates: vec![anchor],
                        images: Vec::new(),
                        creator_user_id: user_id.to_string(),
                        created_date_time: created,
                    },
                )),
            }

            data.editors.push(Entity::new(
                EditorKeys::for_feature(&feature_id, feature_type)
                    .with_user(user_id)
                    .with_editor_type(EditorType::Owner),
                EditorAttrs {
                    created_date_time: created,
                    granted_by: None,
                },
            ));

            data.changelogs.push(Entity::new(
                ChangelogKeys::for_feature(&feature_id, feature_type)
                    .with_date(changelog_timestamp(created))
                    .with_country(country_code)
                    .with_user(user_id),
                ChangelogAttrs {
                    action_type: ChangelogAction::Created,
                    html_text: format!("<b>{}</b> {} created", feature_id, feature_type),
                    updated_paths: Vec::new(),
                },
            ));
        }
    }

    data
}

/// Write the seed data through the repository. Returns the number of items written.
pub async fn seed(repository: &SlackmapRepository<DynamoDbStorage>, data: &SeedData) -> Result<usize> {
    repository.put_country_info(&data.country).await?;
    for line in &data.lines {
        repository.put_line_details(line).await?;
    }
    for spot in &data.spots {
        repository.put_spot_details(spot).await?;
    }
    for guide in &data.guides {
        repository.put_guide_details(guide).await?;
    }
    for editor in &data.editors {
        repository.put_feature_editor(editor).await?;
    }
    for changelog in &data.changelogs {
        repository.put_feature_changelog(changelog).await?;
    }
    Ok(data.item_count())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_generate_seed_data() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let data = generate_seed_data("pl", "Poland", "u1", 3, now);

        assert_eq!(data.lines.len(), 3);
        assert_eq!(data.spots.len(), 3);
        assert_eq!(data.guides.len(), 3);
        assert_eq!(data.editors.len(), 9);
        assert_eq!(data.changelogs.len(), 9);
        assert_eq!(data.item_count(), 28);

        assert_eq!(data.lines[0].keys.feature_id.as_deref(), Some("pl-line-1"));
        assert_eq!(
            data.changelogs[0].keys.changelog_date.as_deref(),
            Some("2024-04-28T12:00:00.000Z")
        );
        assert!(data
            .editors
            .iter()
            .all(|e| e.keys.editor_type == Some(EditorType::Owner)));
    }
}
