use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tourbook_catalog::{Capacity, TourSummary};
use tourbook_core::repository::ReservationRepository;
use tourbook_core::reservations::{authorize_transition, StatusChange};
use tourbook_core::{Caller, CoreError, CoreResult};
use tourbook_order::{Reservation, ReservationStatus, ReservationWithTour};

use crate::database::db_err;

pub struct StoreReservationRepository {
    pool: PgPool,
}

impl StoreReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_RESERVATION: &str = r#"
    SELECT r.id, r.tour_id, r.user_id, r.name, r.email, r.phone, r.number_of_people,
           r.total_price, r.status, r.created_at, r.updated_at,
           t.title AS tour_title, t.price AS tour_price, t.available AS tour_available,
           t.start_date AS tour_start_date, t.end_date AS tour_end_date
    FROM reservations r
    JOIN tours t ON t.id = r.tour_id
"#;

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    tour_id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    email: String,
    phone: Option<String>,
    number_of_people: i32,
    total_price: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tour_title: String,
    tour_price: f64,
    tour_available: i32,
    tour_start_date: NaiveDate,
    tour_end_date: NaiveDate,
}

impl TryFrom<ReservationRow> for ReservationWithTour {
    type Error = CoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status: ReservationStatus = row.status.parse().map_err(|_| {
            CoreError::Internal(format!("Reservation {} has unknown status {}", row.id, row.status))
        })?;

        Ok(ReservationWithTour {
            reservation: Reservation {
                id: row.id,
                tour_id: row.tour_id,
                user_id: row.user_id,
                name: row.name,
                email: row.email,
                phone: row.phone,
                number_of_people: row.number_of_people,
                total_price: row.total_price,
                status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            tour: TourSummary {
                id: row.tour_id,
                title: row.tour_title,
                price: row.tour_price,
                available: row.tour_available,
                start_date: row.tour_start_date,
                end_date: row.tour_end_date,
            },
        })
    }
}

fn into_details(rows: Vec<ReservationRow>) -> CoreResult<Vec<ReservationWithTour>> {
    rows.into_iter().map(ReservationWithTour::try_from).collect()
}

#[async_trait]
impl ReservationRepository for StoreReservationRepository {
    async fn get_reservation(&self, id: Uuid) -> CoreResult<Option<ReservationWithTour>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{} WHERE r.id = $1", SELECT_RESERVATION))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(ReservationWithTour::try_from).transpose()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        caller: &Caller,
        target: ReservationStatus,
    ) -> CoreResult<StatusChange> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Locks both the reservation and its tour row until commit, so a
        // concurrent cancel waits and then observes the committed status.
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "{} WHERE r.id = $1 FOR UPDATE",
            SELECT_RESERVATION
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| CoreError::NotFound(format!("Reservation {} not found", id)))?;

        let mut current = ReservationWithTour::try_from(row)?;
        let plan = authorize_transition(caller, &current.reservation, target)?;

        if plan.releases_capacity() {
            let mut capacity = Capacity::new(current.tour.available)?;
            capacity.release(plan.release_seats)?;

            sqlx::query("UPDATE tours SET available = $1, updated_at = NOW() WHERE id = $2")
                .bind(capacity.available())
                .bind(current.tour.id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            current.tour.available = capacity.available();
        }

        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE reservations SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING updated_at",
        )
        .bind(plan.to.as_str())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        current.reservation.status = plan.to;
        current.reservation.updated_at = updated_at;

        Ok(StatusChange {
            reservation: current,
            plan,
        })
    }

    async fn list_for_requester(&self, user_id: Uuid, email: &str) -> CoreResult<Vec<ReservationWithTour>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{} WHERE r.user_id = $1 OR LOWER(r.email) = LOWER($2) ORDER BY r.created_at DESC",
            SELECT_RESERVATION
        ))
        .bind(user_id)
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        into_details(rows)
    }

    async fn list_reservations(&self, status: Option<ReservationStatus>) -> CoreResult<Vec<ReservationWithTour>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ReservationRow>(&format!(
                    "{} WHERE r.status = $1 ORDER BY r.created_at DESC",
                    SELECT_RESERVATION
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ReservationRow>(&format!(
                    "{} ORDER BY r.created_at DESC",
                    SELECT_RESERVATION
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        into_details(rows)
    }
}
