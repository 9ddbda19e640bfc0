use crate::database::{
    model::booking::{BookingGuardRow, BookingRow, BookingSlotRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    booking::{
        admission::{self, ReservedSlot, TimeSlot},
        event::{CreateBooking, DeleteBooking, UpdateBooking, UpdateBookingStatus},
        Booking, BookingStatus,
    },
    id::{BookingId, UserId, VenueId},
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

// Joined projection shared by every read that returns full bookings.
const SELECT_BOOKING: &str = r#"
    SELECT
        b.id,
        b.user_id,
        u.username,
        b.venue_id,
        v.name AS venue_name,
        v.capacity,
        b.event_name,
        b.start_time,
        b.end_time,
        b.status
    FROM bookings AS b
    INNER JOIN users AS u ON b.user_id = u.id
    INNER JOIN venues AS v ON b.venue_id = v.id
"#;

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let mut tx = self.db.begin().await?;

        // The whole evaluate-then-commit sequence runs under SERIALIZABLE
        // isolation: of two racing requests for overlapping windows on the
        // same venue, one commits and the other either observes the winner's
        // row (overlap) or aborts with a serialization failure.
        self.set_transaction_serializable(&mut tx).await?;

        let venue_exists: Option<(VenueId,)> =
            sqlx::query_as("SELECT id FROM venues WHERE id = $1")
                .bind(event.venue_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        if venue_exists.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "venue ({}) not found",
                event.venue_id
            )));
        }

        let existing = self
            .fetch_blocking_slots(&mut tx, event.venue_id, None)
            .await?;
        let candidate = TimeSlot {
            start: event.start_time,
            end: event.end_time,
        };
        admission::evaluate(&candidate, &existing)?;

        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO bookings (id, user_id, venue_id, event_name, start_time, end_time, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking_id)
        .bind(event.booked_by)
        .bind(event.venue_id)
        .bind(&event.event_name)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(BookingStatus::Pending.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::UniquenessViolation(format!("booking ({booking_id}) already exists"))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::EntityNotFound(format!("user ({}) not found", event.booked_by))
            }
            _ => AppError::SpecificOperationError(e),
        })?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking_id)
    }

    async fn find_all(&self) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            &format!("{SELECT_BOOKING} ORDER BY b.start_time ASC"),
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{SELECT_BOOKING} WHERE b.id = $1"))
            .bind(booking_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKING} WHERE b.user_id = $1 ORDER BY b.start_time ASC"
        ))
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_blocking_by_venue_id(&self, venue_id: VenueId) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"{SELECT_BOOKING}
                WHERE b.venue_id = $1 AND b.status IN ('pending', 'approved')
                ORDER BY b.start_time ASC"#
        ))
        .bind(venue_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn update(&self, event: UpdateBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let guard = self.fetch_guard(&mut tx, event.booking_id).await?;
        let status = guard.status()?;
        if status.is_terminal() {
            return Err(AppError::InvalidStatusTransition(format!(
                "booking ({}) is {} and can no longer be edited",
                event.booking_id, status
            )));
        }

        // The booking's own window must not block its edit.
        let existing = self
            .fetch_blocking_slots(&mut tx, guard.venue_id, Some(event.booking_id))
            .await?;
        let candidate = TimeSlot {
            start: event.start_time,
            end: event.end_time,
        };
        admission::evaluate(&candidate, &existing)?;

        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET
                    event_name = $2,
                    start_time = $3,
                    end_time = $4,
                    updated_at = now()
                WHERE id = $1
            "#,
        )
        .bind(event.booking_id)
        .bind(&event.event_name)
        .bind(event.start_time)
        .bind(event.end_time)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn update_status(&self, event: UpdateBookingStatus) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let guard = self.fetch_guard(&mut tx, event.booking_id).await?;
        let current = guard.status()?;
        if !current.can_transition_to(event.status) {
            return Err(AppError::InvalidStatusTransition(format!(
                "booking ({}) cannot move from {} to {}",
                event.booking_id, current, event.status
            )));
        }

        // A booking that sat in pending may meanwhile have lost its window
        // to another one, so moving into approved re-runs admission.
        if event.status == BookingStatus::Approved {
            let existing = self
                .fetch_blocking_slots(&mut tx, guard.venue_id, Some(event.booking_id))
                .await?;
            let candidate = TimeSlot {
                start: guard.start_time,
                end: guard.end_time,
            };
            admission::evaluate(&candidate, &existing)?;
        }

        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET status = $2, updated_at = now()
                WHERE id = $1
            "#,
        )
        .bind(event.booking_id)
        .bind(event.status.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn delete(&self, event: DeleteBooking) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(event.booking_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "booking ({}) not found",
                event.booking_id
            )));
        }
        Ok(())
    }
}

impl BookingRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    /// Windows that currently hold time on the venue, optionally excluding
    /// one booking (used when that booking itself is being edited or
    /// approved).
    async fn fetch_blocking_slots(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        venue_id: VenueId,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<ReservedSlot>> {
        let rows = sqlx::query_as::<_, BookingSlotRow>(
            r#"
                SELECT start_time, end_time, status
                FROM bookings
                WHERE venue_id = $1
                  AND ($2::uuid IS NULL OR id <> $2)
                  AND status IN ('pending', 'approved')
                ORDER BY start_time ASC
            "#,
        )
        .bind(venue_id)
        .bind(exclude)
        .fetch_all(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(ReservedSlot::try_from).collect()
    }

    async fn fetch_guard(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: BookingId,
    ) -> AppResult<BookingGuardRow> {
        sqlx::query_as::<_, BookingGuardRow>(
            r#"
                SELECT venue_id, start_time, end_time, status
                FROM bookings
                WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({booking_id}) not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{user::UserRepositoryImpl, venue::VenueRepositoryImpl};
    use chrono::{DateTime, TimeZone, Utc};
    use kernel::model::{
        role::Role,
        user::event::CreateUser,
        venue::event::{CreateVenue, DeleteVenue},
    };
    use kernel::repository::{user::UserRepository, venue::VenueRepository};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, hour, min, 0).unwrap()
    }

    async fn fixture(pool: &sqlx::PgPool) -> anyhow::Result<(UserId, VenueId)> {
        let users = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let venues = VenueRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let user = users
            .create(CreateUser::new(
                "aiko".into(),
                "aiko@example.ac.jp".into(),
                "open sesame".into(),
                Role::User,
            ))
            .await?;
        let venue = venues
            .create(CreateVenue {
                name: "Main Hall".into(),
                capacity: 300,
                description: "Auditorium".into(),
            })
            .await?;
        Ok((user.user_id, venue.venue_id))
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn created_booking_round_trips_through_blocking_list(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let booking_id = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Orientation".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await?;

        let blocking = repo.find_blocking_by_venue_id(venue_id).await?;
        assert_eq!(blocking.len(), 1);

        let booking = &blocking[0];
        assert_eq!(booking.booking_id, booking_id);
        assert_eq!(booking.booked_by, user_id);
        assert_eq!(booking.username, "aiko");
        assert_eq!(booking.event_name, "Orientation");
        assert_eq!(booking.start_time, at(10, 0));
        assert_eq!(booking.end_time, at(11, 0));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.venue.venue_id, venue_id);
        assert_eq!(booking.venue.name, "Main Hall");
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn overlapping_window_is_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(CreateBooking::new(
            venue_id,
            user_id,
            "Orientation".into(),
            at(10, 0),
            at(11, 0),
        ))
        .await?;

        let res = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Club meetup".into(),
                at(10, 30),
                at(11, 30),
            ))
            .await;
        assert!(matches!(res, Err(AppError::BookingOverlap(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn touching_windows_are_both_admitted(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(CreateBooking::new(
            venue_id,
            user_id,
            "Morning slot".into(),
            at(10, 0),
            at(11, 0),
        ))
        .await?;
        repo.create(CreateBooking::new(
            venue_id,
            user_id,
            "Noon slot".into(),
            at(11, 0),
            at(12, 0),
        ))
        .await?;

        let blocking = repo.find_blocking_by_venue_id(venue_id).await?;
        assert_eq!(blocking.len(), 2);
        // ordered by start time
        assert_eq!(blocking[0].event_name, "Morning slot");
        assert_eq!(blocking[1].event_name, "Noon slot");
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn empty_window_is_an_invalid_range(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let res = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Nothing".into(),
                at(12, 0),
                at(12, 0),
            ))
            .await;
        assert!(matches!(res, Err(AppError::InvalidTimeRange(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn booking_against_unknown_venue_is_not_found(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, _) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let res = repo
            .create(CreateBooking::new(
                VenueId::new(),
                user_id,
                "Ghost".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn cancelled_booking_frees_its_window_but_stays_frozen(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let booking_id = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Orientation".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await?;

        repo.update_status(UpdateBookingStatus::new(booking_id, BookingStatus::Approved))
            .await?;
        repo.update_status(UpdateBookingStatus::new(booking_id, BookingStatus::Cancelled))
            .await?;

        // the window is free again
        repo.create(CreateBooking::new(
            venue_id,
            user_id,
            "Replacement".into(),
            at(10, 0),
            at(11, 0),
        ))
        .await?;

        // and the cancelled booking accepts no further transition
        let res = repo
            .update_status(UpdateBookingStatus::new(booking_id, BookingStatus::Approved))
            .await;
        assert!(matches!(res, Err(AppError::InvalidStatusTransition(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn approval_re_validates_the_window(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let first = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "First".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await?;
        let second = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Second".into(),
                at(11, 0),
                at(12, 0),
            ))
            .await?;
        repo.update_status(UpdateBookingStatus::new(first, BookingStatus::Approved))
            .await?;

        // Force the second booking onto the first one's window behind the
        // repository's back; approving it must now fail the admission
        // re-check even though the transition itself would be legal.
        sqlx::query("UPDATE bookings SET start_time = $2, end_time = $3 WHERE id = $1")
            .bind(second)
            .bind(at(10, 30))
            .bind(at(11, 30))
            .execute(&pool)
            .await?;

        let res = repo
            .update_status(UpdateBookingStatus::new(second, BookingStatus::Approved))
            .await;
        assert!(matches!(res, Err(AppError::BookingOverlap(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn edit_re_runs_admission_excluding_itself(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let booking_id = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Orientation".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await?;
        repo.create(CreateBooking::new(
            venue_id,
            user_id,
            "Noon slot".into(),
            at(12, 0),
            at(13, 0),
        ))
        .await?;

        // shifting within its own window is fine; the booking does not
        // collide with itself
        repo.update(UpdateBooking::new(
            booking_id,
            "Orientation (long)".into(),
            at(10, 0),
            at(11, 30),
        ))
        .await?;

        let res = repo
            .update(UpdateBooking::new(
                booking_id,
                "Orientation (too long)".into(),
                at(10, 0),
                at(12, 30),
            ))
            .await;
        assert!(matches!(res, Err(AppError::BookingOverlap(_))));

        let edited = repo.find_by_id(booking_id).await?.unwrap();
        assert_eq!(edited.event_name, "Orientation (long)");
        assert_eq!(edited.end_time, at(11, 30));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn deleted_booking_is_gone(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let booking_id = repo
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Orientation".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await?;

        repo.delete(DeleteBooking::new(booking_id)).await?;
        assert!(repo.find_by_id(booking_id).await?.is_none());

        let res = repo.delete(DeleteBooking::new(booking_id)).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn venue_with_bookings_cannot_be_deleted(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let bookings = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let venues = VenueRepositoryImpl::new(ConnectionPool::new(pool));

        bookings
            .create(CreateBooking::new(
                venue_id,
                user_id,
                "Orientation".into(),
                at(10, 0),
                at(11, 0),
            ))
            .await?;

        let res = venues
            .delete(DeleteVenue {
                venue_id,
                requested_user: user_id,
            })
            .await;
        assert!(matches!(res, Err(AppError::EntityReferenced(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn concurrent_overlapping_requests_admit_exactly_one(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(CreateBooking::new(
            venue_id,
            user_id,
            "Morning".into(),
            at(9, 0),
            at(10, 0),
        ))
        .await?;

        let (a, b) = tokio::join!(
            repo.create(CreateBooking::new(
                venue_id,
                user_id,
                "Racer A".into(),
                at(9, 30),
                at(10, 30),
            )),
            repo.create(CreateBooking::new(
                venue_id,
                user_id,
                "Racer B".into(),
                at(9, 30),
                at(10, 30),
            )),
        );

        // both collide with the existing 09:00-10:00 booking, so neither
        // may win; each sees the overlap or a serialization abort
        for res in [a, b] {
            assert!(matches!(
                res,
                Err(AppError::BookingOverlap(_)
                    | AppError::SpecificOperationError(_)
                    | AppError::TransactionError(_))
            ));
        }
        assert_eq!(repo.find_blocking_by_venue_id(venue_id).await?.len(), 1);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn concurrent_requests_for_a_free_window_admit_exactly_one(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let (user_id, venue_id) = fixture(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let (a, b) = tokio::join!(
            repo.create(CreateBooking::new(
                venue_id,
                user_id,
                "Racer A".into(),
                at(9, 30),
                at(10, 30),
            )),
            repo.create(CreateBooking::new(
                venue_id,
                user_id,
                "Racer B".into(),
                at(9, 30),
                at(10, 30),
            )),
        );

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert!(winners <= 1, "two overlapping bookings were both admitted");
        assert!(repo.find_blocking_by_venue_id(venue_id).await?.len() <= 1);
        Ok(())
    }
}
