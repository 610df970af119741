use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use tourbook_catalog::{Category, ItineraryDay, NewCategory, Tour, TourDraft, TourImage};
use tourbook_core::repository::TourRepository;
use tourbook_core::{CoreError, CoreResult};

use crate::database::db_err;

pub struct StoreTourRepository {
    pool: PgPool,
}

impl StoreTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_TOUR: &str = r#"
    SELECT id, title, description, location, price, available, start_date, end_date,
           is_active, category_id, created_at, updated_at
    FROM tours
"#;

#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    location: Option<String>,
    price: f64,
    available: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItineraryRow {
    tour_id: Uuid,
    day: i32,
    title: String,
    description: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    tour_id: Uuid,
    url: String,
    alt: Option<String>,
    position: i32,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
        }
    }
}

impl StoreTourRepository {
    /// Attach ordered itinerary days and images to a batch of tour rows.
    async fn hydrate(&self, rows: Vec<TourRow>) -> CoreResult<Vec<Tour>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let days = sqlx::query_as::<_, ItineraryRow>(
            "SELECT tour_id, day, title, description FROM itinerary_days WHERE tour_id = ANY($1) ORDER BY day",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let images = sqlx::query_as::<_, ImageRow>(
            "SELECT tour_id, url, alt, position FROM tour_images WHERE tour_id = ANY($1) ORDER BY position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut itinerary: HashMap<Uuid, Vec<ItineraryDay>> = HashMap::new();
        for d in days {
            itinerary.entry(d.tour_id).or_default().push(ItineraryDay {
                day: d.day,
                title: d.title,
                description: d.description,
            });
        }

        let mut gallery: HashMap<Uuid, Vec<TourImage>> = HashMap::new();
        for img in images {
            gallery.entry(img.tour_id).or_default().push(TourImage {
                url: img.url,
                alt: img.alt,
                position: img.position,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Tour {
                itinerary: itinerary.remove(&row.id).unwrap_or_default(),
                images: gallery.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                description: row.description,
                location: row.location,
                price: row.price,
                available: row.available,
                start_date: row.start_date,
                end_date: row.end_date,
                is_active: row.is_active,
                category_id: row.category_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn fetch_tour(&self, id: Uuid) -> CoreResult<Tour> {
        let row = sqlx::query_as::<_, TourRow>(&format!("{} WHERE id = $1", SELECT_TOUR))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| CoreError::NotFound(format!("Tour {} not found", id)))?;

        self.hydrate(vec![row])
            .await?
            .pop()
            .ok_or_else(|| CoreError::Internal(format!("Tour {} vanished while loading", id)))
    }
}

async fn replace_children(tx: &mut Transaction<'_, Postgres>, tour: &Tour) -> CoreResult<()> {
    sqlx::query("DELETE FROM itinerary_days WHERE tour_id = $1")
        .bind(tour.id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    sqlx::query("DELETE FROM tour_images WHERE tour_id = $1")
        .bind(tour.id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    for day in &tour.itinerary {
        sqlx::query("INSERT INTO itinerary_days (tour_id, day, title, description) VALUES ($1, $2, $3, $4)")
            .bind(tour.id)
            .bind(day.day)
            .bind(&day.title)
            .bind(&day.description)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
    }

    for img in &tour.images {
        sqlx::query("INSERT INTO tour_images (id, tour_id, url, alt, position) VALUES ($1, $2, $3, $4, $5)")
            .bind(Uuid::new_v4())
            .bind(tour.id)
            .bind(&img.url)
            .bind(&img.alt)
            .bind(img.position)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
    }

    Ok(())
}

fn missing_category(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return CoreError::InvalidInput("Unknown category".to_string());
        }
    }
    db_err(err)
}

#[async_trait]
impl TourRepository for StoreTourRepository {
    async fn create_tour(&self, draft: TourDraft) -> CoreResult<Tour> {
        draft.validate()?;
        let tour = Tour::from_draft(Uuid::new_v4(), draft);

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO tours (id, title, description, location, price, available, start_date, end_date, is_active, category_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(tour.id)
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(&tour.location)
        .bind(tour.price)
        .bind(tour.available)
        .bind(tour.start_date)
        .bind(tour.end_date)
        .bind(tour.is_active)
        .bind(tour.category_id)
        .bind(tour.created_at)
        .bind(tour.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(missing_category)?;

        replace_children(&mut tx, &tour).await?;
        tx.commit().await.map_err(db_err)?;

        Ok(tour)
    }

    async fn get_tour(&self, id: Uuid) -> CoreResult<Option<Tour>> {
        match self.fetch_tour(id).await {
            Ok(tour) => Ok(Some(tour)),
            Err(CoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_tours(&self, active_only: bool) -> CoreResult<Vec<Tour>> {
        let sql = if active_only {
            format!("{} WHERE is_active ORDER BY start_date, title", SELECT_TOUR)
        } else {
            format!("{} ORDER BY start_date, title", SELECT_TOUR)
        };

        let rows = sqlx::query_as::<_, TourRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        self.hydrate(rows).await
    }

    async fn update_tour(&self, id: Uuid, draft: TourDraft) -> CoreResult<Tour> {
        draft.validate()?;
        let mut tour = self.fetch_tour(id).await?;
        tour.apply_draft(draft);

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            r#"
            UPDATE tours
            SET title = $1, description = $2, location = $3, price = $4, available = $5,
                start_date = $6, end_date = $7, is_active = $8, category_id = $9, updated_at = $10
            WHERE id = $11
            "#,
        )
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(&tour.location)
        .bind(tour.price)
        .bind(tour.available)
        .bind(tour.start_date)
        .bind(tour.end_date)
        .bind(tour.is_active)
        .bind(tour.category_id)
        .bind(tour.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(missing_category)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Tour {} not found", id)));
        }

        replace_children(&mut tx, &tour).await?;
        tx.commit().await.map_err(db_err)?;

        Ok(tour)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> CoreResult<Tour> {
        let result = sqlx::query("UPDATE tours SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Tour {} not found", id)));
        }

        self.fetch_tour(id).await
    }

    async fn delete_tour(&self, id: Uuid) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM tours WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if locked.is_none() {
            return Err(CoreError::NotFound(format!("Tour {} not found", id)));
        }

        let reservations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE tour_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
        if reservations > 0 {
            return Err(CoreError::Conflict(format!(
                "Tour {} has {} reservation(s) and cannot be deleted",
                id, reservations
            )));
        }

        sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn current_prices(&self, ids: &[Uuid]) -> CoreResult<HashMap<Uuid, f64>> {
        let rows: Vec<(Uuid, f64)> = sqlx::query_as("SELECT id, price FROM tours WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().collect())
    }

    async fn update_price(&self, id: Uuid, price: f64) -> CoreResult<()> {
        let result = sqlx::query("UPDATE tours SET price = $1, updated_at = NOW() WHERE id = $2")
            .bind(price)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Tour {} not found", id)));
        }
        Ok(())
    }

    async fn create_category(&self, category: NewCategory) -> CoreResult<Category> {
        category.validate()?;

        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4) RETURNING id, name, slug, description",
        )
        .bind(Uuid::new_v4())
        .bind(category.name.trim())
        .bind(&category.slug)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name, slug, description FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}
