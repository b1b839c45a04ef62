use std::{borrow::Cow, collections::BTreeMap, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
    Connection, Executor, PgPool,
};
use uuid::Uuid;

use crate::error::StoreError;
use crate::filters::{EventFilter, PlaceFilter};
use crate::models::{
    Coordinates, Event, EventCategory, EventContact, Place, PlaceCategory, SubmissionStatus,
};

const PLACE_COLUMNS: &str = r#"
    id,
    name,
    category,
    subcategory,
    description,
    long_description,
    zone,
    address,
    latitude,
    longitude,
    phone,
    email,
    website,
    images,
    rating,
    price_range,
    hours,
    amenities,
    merchant_id,
    status,
    rejection_reason,
    created_at,
    updated_at
"#;

const EVENT_COLUMNS: &str = r#"
    id,
    title,
    description,
    category,
    zone,
    location,
    latitude,
    longitude,
    start_date,
    end_date,
    start_time,
    end_time,
    images,
    organizer,
    contact,
    price,
    merchant_id,
    status,
    rejection_reason,
    created_at,
    updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct PlaceRow {
    id: Uuid,
    name: String,
    category: PlaceCategory,
    subcategory: Option<String>,
    description: String,
    long_description: Option<String>,
    zone: String,
    address: String,
    latitude: f64,
    longitude: f64,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    images: Vec<String>,
    rating: f64,
    price_range: Option<String>,
    hours: Option<Json<BTreeMap<String, String>>>,
    amenities: Vec<String>,
    merchant_id: Option<Uuid>,
    status: SubmissionStatus,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            id: row.id,
            name: row.name,
            category: row.category,
            subcategory: row.subcategory,
            description: row.description,
            long_description: row.long_description,
            zone: row.zone,
            address: row.address,
            coordinates: Coordinates {
                lat: row.latitude,
                lng: row.longitude,
            },
            phone: row.phone,
            email: row.email,
            website: row.website,
            images: row.images,
            rating: row.rating,
            price_range: row.price_range.and_then(|raw| raw.parse().ok()),
            hours: row.hours.map(|Json(hours)| hours),
            amenities: row.amenities,
            merchant_id: row.merchant_id,
            status: row.status,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    category: EventCategory,
    zone: String,
    location: String,
    latitude: f64,
    longitude: f64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    start_time: String,
    end_time: Option<String>,
    images: Vec<String>,
    organizer: Option<String>,
    contact: Option<Json<EventContact>>,
    price: Option<String>,
    merchant_id: Option<Uuid>,
    status: SubmissionStatus,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            zone: row.zone,
            location: row.location,
            coordinates: Coordinates {
                lat: row.latitude,
                lng: row.longitude,
            },
            start_date: row.start_date,
            end_date: row.end_date,
            start_time: row.start_time,
            end_time: row.end_time,
            images: row.images,
            organizer: row.organizer,
            contact: row.contact.map(|Json(contact)| contact),
            price: row.price,
            merchant_id: row.merchant_id,
            status: row.status,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `%term%` for ILIKE with wildcard characters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = match Self::pool_options().connect(database_url).await {
            Ok(pool) => pool,
            Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("3D000")) => {
                log::info!("Database missing, attempting to create it");
                create_database_if_missing(database_url).await?;
                Self::pool_options().connect(database_url).await?
            }
            Err(err) => return Err(err),
        };

        // Run embedded migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    fn pool_options() -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Some(Duration::from_secs(600)))
            .test_before_acquire(true)
    }

    /// Distinguishes "gone" from "no longer pending" after a conditional write missed.
    async fn status_of(&self, table: &str, id: Uuid) -> Result<StoreError, StoreError> {
        let sql = format!("SELECT status FROM {table} WHERE id = $1");
        let status: Option<SubmissionStatus> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match status {
            Some(status) => StoreError::NotPending(status),
            None => StoreError::NotFound,
        })
    }

    // ========================================================================
    // PLACES
    // ========================================================================

    pub async fn list_places(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PLACE_COLUMNS}
            FROM places
            WHERE status = 'approved'
              AND ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1 OR zone ILIKE $1)
              AND (cardinality($2::text[]) = 0 OR zone = ANY($2))
              AND (cardinality($3::text[]) = 0 OR category::text = ANY($3))
              AND (cardinality($4::text[]) = 0 OR price_range = ANY($4))
              AND ($5::float8 IS NULL OR rating >= $5)
            ORDER BY rating DESC, name ASC
            "#
        );

        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(&filter.zones)
            .bind(&filter.categories)
            .bind(&filter.price_ranges)
            .bind(filter.min_rating)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Option<Place>, StoreError> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = $1");
        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Place::from))
    }

    pub async fn insert_place(&self, place: Place) -> Result<Place, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO places ({PLACE_COLUMNS})
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23
            )
            RETURNING {PLACE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(place.id)
            .bind(place.name)
            .bind(place.category)
            .bind(place.subcategory)
            .bind(place.description)
            .bind(place.long_description)
            .bind(place.zone)
            .bind(place.address)
            .bind(place.coordinates.lat)
            .bind(place.coordinates.lng)
            .bind(place.phone)
            .bind(place.email)
            .bind(place.website)
            .bind(place.images)
            .bind(place.rating)
            .bind(place.price_range.map(|p| p.as_str()))
            .bind(place.hours.map(Json))
            .bind(place.amenities)
            .bind(place.merchant_id)
            .bind(place.status)
            .bind(place.rejection_reason)
            .bind(place.created_at)
            .bind(place.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn update_pending_place(&self, place: Place) -> Result<Place, StoreError> {
        let id = place.id;
        let sql = format!(
            r#"
            UPDATE places
            SET
                name = $2,
                category = $3,
                subcategory = $4,
                description = $5,
                long_description = $6,
                zone = $7,
                address = $8,
                latitude = $9,
                longitude = $10,
                phone = $11,
                email = $12,
                website = $13,
                images = $14,
                price_range = $15,
                hours = $16,
                amenities = $17,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PLACE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(place.id)
            .bind(place.name)
            .bind(place.category)
            .bind(place.subcategory)
            .bind(place.description)
            .bind(place.long_description)
            .bind(place.zone)
            .bind(place.address)
            .bind(place.coordinates.lat)
            .bind(place.coordinates.lng)
            .bind(place.phone)
            .bind(place.email)
            .bind(place.website)
            .bind(place.images)
            .bind(place.price_range.map(|p| p.as_str()))
            .bind(place.hours.map(Json))
            .bind(place.amenities)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.status_of("places", id).await?),
        }
    }

    pub async fn delete_pending_place(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.status_of("places", id).await?);
        }
        Ok(())
    }

    pub async fn decide_place(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Place, StoreError> {
        let sql = format!(
            r#"
            UPDATE places
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PLACE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(id)
            .bind(status)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.status_of("places", id).await?),
        }
    }

    pub async fn places_with_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Place>, StoreError> {
        let sql = format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE status = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    pub async fn places_for_merchant(&self, merchant_id: Uuid) -> Result<Vec<Place>, StoreError> {
        let sql = format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE merchant_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(merchant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    pub async fn all_places(&self) -> Result<Vec<Place>, StoreError> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places");
        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    pub async fn approved_places_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Place>, i64), StoreError> {
        let sql = format!(
            r#"
            SELECT {PLACE_COLUMNS}
            FROM places
            WHERE status = 'approved'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM places WHERE status = 'approved'")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Place::from).collect(), total))
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE status = 'approved'
              AND ($1::text IS NULL OR zone = $1)
              AND ($2::event_category IS NULL OR category = $2)
            ORDER BY start_date ASC, start_time ASC
            "#
        );

        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(filter.zone.as_deref())
            .bind(filter.category)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Event::from))
    }

    pub async fn insert_event(&self, event: Event) -> Result<Event, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO events ({EVENT_COLUMNS})
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21
            )
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event.id)
            .bind(event.title)
            .bind(event.description)
            .bind(event.category)
            .bind(event.zone)
            .bind(event.location)
            .bind(event.coordinates.lat)
            .bind(event.coordinates.lng)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.images)
            .bind(event.organizer)
            .bind(event.contact.map(Json))
            .bind(event.price)
            .bind(event.merchant_id)
            .bind(event.status)
            .bind(event.rejection_reason)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn update_pending_event(&self, event: Event) -> Result<Event, StoreError> {
        let id = event.id;
        let sql = format!(
            r#"
            UPDATE events
            SET
                title = $2,
                description = $3,
                category = $4,
                zone = $5,
                location = $6,
                latitude = $7,
                longitude = $8,
                start_date = $9,
                end_date = $10,
                start_time = $11,
                end_time = $12,
                images = $13,
                organizer = $14,
                contact = $15,
                price = $16,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event.id)
            .bind(event.title)
            .bind(event.description)
            .bind(event.category)
            .bind(event.zone)
            .bind(event.location)
            .bind(event.coordinates.lat)
            .bind(event.coordinates.lng)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.images)
            .bind(event.organizer)
            .bind(event.contact.map(Json))
            .bind(event.price)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.status_of("events", id).await?),
        }
    }

    pub async fn delete_pending_event(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.status_of("events", id).await?);
        }
        Ok(())
    }

    pub async fn decide_event(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Event, StoreError> {
        let sql = format!(
            r#"
            UPDATE events
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(status)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.status_of("events", id).await?),
        }
    }

    pub async fn events_with_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn events_for_merchant(&self, merchant_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE merchant_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(merchant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn all_events(&self) -> Result<Vec<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events");
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn approved_events_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64), StoreError> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE status = 'approved'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = 'approved'")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Event::from).collect(), total))
    }
}

async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    let database_name = options
        .get_database()
        .map(|name| name.to_string())
        .unwrap_or_else(|| "postgres".to_string());

    if database_name.eq_ignore_ascii_case("postgres") {
        return Ok(());
    }

    let maintenance_options = options.clone().database("postgres");
    let mut connection = sqlx::postgres::PgConnection::connect_with(&maintenance_options).await?;

    let escaped_name = database_name.replace('"', "\"\"");
    let create_stmt = format!("CREATE DATABASE \"{}\"", escaped_name);

    match connection.execute(create_stmt.as_str()).await {
        Ok(_) => {
            log::info!("Created database '{}'", database_name);
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("42P04")) => {
            log::info!("Database '{}' already exists", database_name);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("serrana"), "%serrana%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }
}
