use crate::database::{
    model::venue::{PaginatedVenueRow, VenueRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::VenueId,
    list::{ListOptions, PaginatedList},
    venue::{
        event::{CreateVenue, DeleteVenue, UpdateVenue},
        Venue,
    },
};
use kernel::repository::venue::VenueRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct VenueRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl VenueRepository for VenueRepositoryImpl {
    async fn create(&self, event: CreateVenue) -> AppResult<Venue> {
        let venue_id = VenueId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO venues (id, name, capacity, description)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(venue_id)
        .bind(&event.name)
        .bind(event.capacity)
        .bind(&event.description)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No venue record has been created".into(),
            ));
        }

        Ok(Venue {
            venue_id,
            name: event.name,
            capacity: event.capacity,
            description: event.description,
        })
    }

    async fn find_all(&self, options: ListOptions) -> AppResult<PaginatedList<Venue>> {
        let ListOptions { limit, offset } = options;
        let rows = sqlx::query_as::<_, PaginatedVenueRow>(
            r#"
                SELECT
                    COUNT(*) OVER() AS total,
                    id,
                    name,
                    capacity,
                    description
                FROM venues
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let total = rows.first().map(|r| r.total).unwrap_or_default();
        Ok(PaginatedList {
            total,
            limit,
            offset,
            items: rows.into_iter().map(Venue::from).collect(),
        })
    }

    async fn find_by_id(&self, venue_id: VenueId) -> AppResult<Option<Venue>> {
        let row = sqlx::query_as::<_, VenueRow>(
            r#"
                SELECT id, name, capacity, description
                FROM venues
                WHERE id = $1
            "#,
        )
        .bind(venue_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Venue::from))
    }

    async fn update(&self, event: UpdateVenue) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE venues
                SET
                    name = COALESCE($2, name),
                    capacity = COALESCE($3, capacity),
                    description = COALESCE($4, description)
                WHERE id = $1
            "#,
        )
        .bind(event.venue_id)
        .bind(&event.name)
        .bind(event.capacity)
        .bind(&event.description)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "venue ({}) not found",
                event.venue_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, event: DeleteVenue) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // The venue must not disappear under bookings that still reference
        // it; terminal bookings keep their rows as history, so they hold
        // the venue too.
        let (referencing,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE venue_id = $1")
                .bind(event.venue_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

        if referencing > 0 {
            return Err(AppError::EntityReferenced(format!(
                "venue ({}) still has {} booking(s); remove them first",
                event.venue_id, referencing
            )));
        }

        let res = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(event.venue_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "venue ({}) not found",
                event.venue_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::id::UserId;

    fn list_options() -> ListOptions {
        ListOptions {
            limit: 20,
            offset: 0,
        }
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn created_venue_round_trips(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = VenueRepositoryImpl::new(ConnectionPool::new(pool));

        let venue = repo
            .create(CreateVenue {
                name: "Main Hall".into(),
                capacity: 300,
                description: "Auditorium with a stage".into(),
            })
            .await?;

        let listed = repo.find_all(list_options()).await?;
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items, vec![venue.clone()]);

        let found = repo.find_by_id(venue.venue_id).await?;
        assert_eq!(found, Some(venue));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn update_changes_only_provided_fields(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = VenueRepositoryImpl::new(ConnectionPool::new(pool));

        let venue = repo
            .create(CreateVenue {
                name: "Seminar Room B".into(),
                capacity: 24,
                description: "Second floor".into(),
            })
            .await?;

        repo.update(UpdateVenue {
            venue_id: venue.venue_id,
            name: None,
            capacity: Some(30),
            description: None,
            requested_user: UserId::new(),
        })
        .await?;

        let updated = repo.find_by_id(venue.venue_id).await?.unwrap();
        assert_eq!(updated.name, "Seminar Room B");
        assert_eq!(updated.capacity, 30);
        assert_eq!(updated.description, "Second floor");
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn delete_of_missing_venue_is_not_found(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = VenueRepositoryImpl::new(ConnectionPool::new(pool));

        let res = repo
            .delete(DeleteVenue {
                venue_id: VenueId::new(),
                requested_user: UserId::new(),
            })
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }
}
