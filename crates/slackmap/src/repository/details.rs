use slackmap_core::entities::{
    DetailsKeys, GuideDetails, LineDetails, SpotDetails, GUIDE_DETAILS, LINE_DETAILS,
    SPOT_DETAILS,
};
use slackmap_core::storage::{Result, StorageClient};

use super::SlackmapRepository;

impl<S: StorageClient> SlackmapRepository<S> {
    pub async fn get_line_details(&self, feature_id: &str) -> Result<Option<LineDetails>> {
        self.get_entity(&LINE_DETAILS, &DetailsKeys::new(feature_id))
            .await
    }

    pub async fn put_line_details(&self, details: &LineDetails) -> Result<()> {
        self.put_entity(&LINE_DETAILS, details).await
    }

    pub async fn delete_line_details(&self, feature_id: &str) -> Result<()> {
        self.delete_entity(&LINE_DETAILS, &DetailsKeys::new(feature_id))
            .await
    }

    pub async fn get_spot_details(&self, feature_id: &str) -> Result<Option<SpotDetails>> {
        self.get_entity(&SPOT_DETAILS, &DetailsKeys::new(feature_id))
            .await
    }

    pub async fn put_spot_details(&self, details: &SpotDetails) -> Result<()> {
        self.put_entity(&SPOT_DETAILS, details).await
    }

    pub async fn delete_spot_details(&self, feature_id: &str) -> Result<()> {
        self.delete_entity(&SPOT_DETAILS, &DetailsKeys::new(feature_id))
            .await
    }

    pub async fn get_guide_details(&self, feature_id: &str) -> Result<Option<GuideDetails>> {
        self.get_entity(&GUIDE_DETAILS, &DetailsKeys::new(feature_id))
            .await
    }

    pub async fn put_guide_details(&self, details: &GuideDetails) -> Result<()> {
        self.put_entity(&GUIDE_DETAILS, details).await
    }

    pub async fn delete_guide_details(&self, feature_id: &str) -> Result<()> {
        self.delete_entity(&GUIDE_DETAILS, &DetailsKeys::new(feature_id))
            .await
    }
}
