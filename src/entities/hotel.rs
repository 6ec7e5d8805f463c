use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A room embedded in a hotel record. Rooms have no identity outside their
/// parent hotel; the `id` is only unique within the hotel's room list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: String,
    pub room_type: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub max_guests: i32,
    #[serde(default)]
    pub bed_type: String,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub amenities: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "hotels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// JSON array of image URLs
    pub images: Json,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub address: String,
    pub rating: Decimal,
    pub review_count: i32,
    /// JSON array of amenity names
    pub amenities: Json,
    /// JSON array of embedded [`Room`] records
    pub rooms: Json,
    /// Headline rate shown in search results
    pub price_per_night: Decimal,
    pub featured: bool,
    pub cancellation_policy: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decodes the embedded room list.
    pub fn room_list(&self) -> Result<Vec<Room>, serde_json::Error> {
        serde_json::from_value(self.rooms.clone())
    }

    /// Finds a room by its in-hotel identifier.
    pub fn find_room(&self, room_id: &str) -> Option<Room> {
        self.room_list()
            .ok()?
            .into_iter()
            .find(|room| room.id == room_id)
    }

    /// First image URL, or an empty string when none is set.
    pub fn primary_image(&self) -> String {
        self.images
            .as_array()
            .and_then(|images| images.first())
            .and_then(|image| image.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// "City, Country" display form used for booking snapshots.
    pub fn display_location(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}
