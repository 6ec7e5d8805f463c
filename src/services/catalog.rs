use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{hotel, review};
use crate::errors::ServiceError;

/// Hotel catalog: search, detail, reviews, and the admin-side CRUD.
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HotelSearchQuery {
    /// Substring match over hotel name, city, and country
    pub location: Option<String>,
    /// Exact-ish city filter (substring on the city column)
    pub city: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub featured: Option<bool>,
    /// One of: price_low, price_high, rating, popular
    pub sort_by: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl HotelSearchQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    fn validate_range(&self) -> Result<(), ServiceError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ServiceError::ValidationError(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct HotelInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(length(min = 1))]
    pub city: String,
    pub state: Option<String>,
    #[validate(length(min = 1))]
    pub country: String,
    pub address: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub rooms: Vec<hotel::Room>,
    pub price_per_night: Decimal,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_cancellation_policy")]
    pub cancellation_policy: String,
}

fn default_cancellation_policy() -> String {
    "Free cancellation up to 24 hours before check-in".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Paginated search over the catalog. Returns the page of hotels and the
    /// total match count.
    #[instrument(skip(self))]
    pub async fn search_hotels(
        &self,
        query: &HotelSearchQuery,
    ) -> Result<(Vec<hotel::Model>, u64), ServiceError> {
        query.validate_range()?;

        let mut select = hotel::Entity::find();
        if let Some(location) = &query.location {
            let location = location.trim();
            if !location.is_empty() {
                select = select.filter(
                    Condition::any()
                        .add(hotel::Column::Name.contains(location))
                        .add(hotel::Column::City.contains(location))
                        .add(hotel::Column::Country.contains(location)),
                );
            }
        }
        if let Some(city) = &query.city {
            let city = city.trim();
            if !city.is_empty() {
                select = select.filter(hotel::Column::City.contains(city));
            }
        }
        if let Some(min) = query.min_price {
            select = select.filter(hotel::Column::PricePerNight.gte(min));
        }
        if let Some(max) = query.max_price {
            select = select.filter(hotel::Column::PricePerNight.lte(max));
        }
        if let Some(rating) = query.min_rating {
            select = select.filter(hotel::Column::Rating.gte(rating));
        }
        if let Some(featured) = query.featured {
            select = select.filter(hotel::Column::Featured.eq(featured));
        }

        select = match query.sort_by.as_deref() {
            Some("price_low") => select.order_by_asc(hotel::Column::PricePerNight),
            Some("price_high") => select.order_by_desc(hotel::Column::PricePerNight),
            Some("rating") => select.order_by_desc(hotel::Column::Rating),
            Some("popular") => select.order_by_desc(hotel::Column::ReviewCount),
            Some(other) => {
                return Err(ServiceError::ValidationError(format!(
                    "Unknown sort_by value: {}",
                    other
                )))
            }
            None => select
                .order_by_desc(hotel::Column::Featured)
                .order_by_desc(hotel::Column::Rating),
        };

        let paginator = select.paginate(self.db.as_ref(), query.per_page());
        let total = paginator.num_items().await?;
        let hotels = paginator.fetch_page(query.page() - 1).await?;
        Ok((hotels, total))
    }

    pub async fn get_hotel(&self, hotel_id: Uuid) -> Result<hotel::Model, ServiceError> {
        hotel::Entity::find_by_id(hotel_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Hotel {} not found", hotel_id)))
    }

    pub async fn list_featured(&self, limit: u64) -> Result<Vec<hotel::Model>, ServiceError> {
        let hotels = hotel::Entity::find()
            .filter(hotel::Column::Featured.eq(true))
            .order_by_desc(hotel::Column::Rating)
            .paginate(self.db.as_ref(), limit.clamp(1, 50))
            .fetch_page(0)
            .await?;
        Ok(hotels)
    }

    pub async fn list_reviews(&self, hotel_id: Uuid) -> Result<Vec<review::Model>, ServiceError> {
        // Existence check so unknown hotels 404 instead of returning [].
        self.get_hotel(hotel_id).await?;
        let reviews = review::Entity::find()
            .filter(review::Column::HotelId.eq(hotel_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(reviews)
    }

    /// The newest reviews, for embedding in the hotel detail view.
    pub async fn recent_reviews(
        &self,
        hotel_id: Uuid,
        limit: u64,
    ) -> Result<Vec<review::Model>, ServiceError> {
        let reviews = review::Entity::find()
            .filter(review::Column::HotelId.eq(hotel_id))
            .order_by_desc(review::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(reviews)
    }

    /// Inserts a review and folds it into the hotel's running average inside
    /// one transaction.
    #[instrument(skip(self, input))]
    pub async fn add_review(
        &self,
        hotel_id: Uuid,
        user_name: &str,
        input: ReviewInput,
    ) -> Result<review::Model, ServiceError> {
        input.validate()?;
        let hotel = self.get_hotel(hotel_id).await?;

        let txn = self.db.begin().await?;

        let rating = Decimal::from(input.rating);
        let saved = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            hotel_id: Set(hotel_id),
            user_name: Set(user_name.to_string()),
            rating: Set(rating),
            comment: Set(input.comment),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let old_count = Decimal::from(hotel.review_count);
        let new_count = hotel.review_count + 1;
        let new_rating =
            ((hotel.rating * old_count + rating) / Decimal::from(new_count)).round_dp(2);

        let mut hotel_update: hotel::ActiveModel = hotel.into();
        hotel_update.rating = Set(new_rating);
        hotel_update.review_count = Set(new_count);
        hotel_update.updated_at = Set(Utc::now());
        hotel_update.update(&txn).await?;

        txn.commit().await?;
        Ok(saved)
    }

    #[instrument(skip(self, input))]
    pub async fn create_hotel(&self, input: HotelInput) -> Result<hotel::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let record = hotel::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            images: Set(serde_json::to_value(&input.images)?),
            city: Set(input.city),
            state: Set(input.state),
            country: Set(input.country),
            address: Set(input.address),
            rating: Set(Decimal::ZERO),
            review_count: Set(0),
            amenities: Set(serde_json::to_value(&input.amenities)?),
            rooms: Set(serde_json::to_value(&input.rooms)?),
            price_per_night: Set(input.price_per_night),
            featured: Set(input.featured),
            cancellation_policy: Set(input.cancellation_policy),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = record.insert(self.db.as_ref()).await?;
        info!(hotel_id = %saved.id, "created hotel");
        Ok(saved)
    }

    #[instrument(skip(self, input))]
    pub async fn update_hotel(
        &self,
        hotel_id: Uuid,
        input: HotelInput,
    ) -> Result<hotel::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_hotel(hotel_id).await?;

        let mut record: hotel::ActiveModel = existing.into();
        record.name = Set(input.name);
        record.description = Set(input.description);
        record.images = Set(serde_json::to_value(&input.images)?);
        record.city = Set(input.city);
        record.state = Set(input.state);
        record.country = Set(input.country);
        record.address = Set(input.address);
        record.amenities = Set(serde_json::to_value(&input.amenities)?);
        record.rooms = Set(serde_json::to_value(&input.rooms)?);
        record.price_per_night = Set(input.price_per_night);
        record.featured = Set(input.featured);
        record.cancellation_policy = Set(input.cancellation_policy);
        record.updated_at = Set(Utc::now());

        Ok(record.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_hotel(&self, hotel_id: Uuid) -> Result<(), ServiceError> {
        let result = hotel::Entity::delete_by_id(hotel_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Hotel {} not found",
                hotel_id
            )));
        }
        info!(%hotel_id, "deleted hotel");
        Ok(())
    }
}
