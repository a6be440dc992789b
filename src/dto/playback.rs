use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Request to change the preview volume.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VolumeRequest {
    /// Volume between 0 and 100.
    #[validate(range(max = 100))]
    pub volume: u8,
}
