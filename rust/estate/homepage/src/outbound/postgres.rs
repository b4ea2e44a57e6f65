//! Implementation of the listing and featured repositories on Postgres.
//!
//! Featuring an item takes a per kind transaction scoped advisory lock, so two
//! admins racing for the last slot are serialised and the count they observe is
//! the committed one.


use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::{
    model::{
        Blog, BlogDraft, FeatureOutcome, HomepageError, HomepageItem, ItemKind, ListFilter,
        Property, PropertyDraft,
    },
    ports::{FeaturedRepository, ListingRepository},
};

const PROPERTY_COLUMNS: &str = "id, title, description, location, price, is_on_home_page, \
     featured_at, created_at, updated_at";
const BLOG_COLUMNS: &str =
    "id, title, author, content, is_on_home_page, featured_at, created_at, updated_at";
const HOMEPAGE_COLUMNS: &str = "id, title, is_on_home_page, featured_at, updated_at";

/// Advisory lock keys, one per kind so properties and blogs never wait on each other
fn lock_key(kind: ItemKind) -> i64 {
    match kind {
        ItemKind::Property => 0x484f_4d45_0001,
        ItemKind::Blog => 0x484f_4d45_0002,
    }
}

/// The ListingsPgRepo struct is a wrapper around a sqlx::PgPool connected to the listings database.
#[derive(Clone, Debug)]
pub struct ListingsPgRepo {
    /// The underlying sqlx::PgPool
    pool: PgPool,
}

impl ListingsPgRepo {
    /// Creates a new instance of ListingsPgRepo
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    price: i64,
    is_on_home_page: bool,
    featured_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            price: row.price,
            is_on_home_page: row.is_on_home_page,
            featured_at: row.featured_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: Uuid,
    title: String,
    author: String,
    content: String,
    is_on_home_page: bool,
    featured_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Blog {
            id: row.id,
            title: row.title,
            author: row.author,
            content: row.content,
            is_on_home_page: row.is_on_home_page,
            featured_at: row.featured_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HomepageRow {
    id: Uuid,
    title: String,
    is_on_home_page: bool,
    featured_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl HomepageRow {
    fn into_item(self, kind: ItemKind) -> HomepageItem {
        HomepageItem {
            id: self.id,
            kind,
            title: self.title,
            is_on_home_page: self.is_on_home_page,
            featured_at: self.featured_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<sqlx::Error> for HomepageError {
    fn from(e: sqlx::Error) -> Self {
        Self::StorageLayerError(e.into())
    }
}

fn new_id() -> Uuid {
    Uuid::new_v7(Timestamp::now(NoContext))
}

impl ListingRepository for ListingsPgRepo {
    #[tracing::instrument(skip(self), err)]
    async fn create_property(&self, draft: PropertyDraft) -> Result<Property, HomepageError> {
        let sql = format!(
            "INSERT INTO property (id, title, description, location, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROPERTY_COLUMNS}"
        );
        let row: PropertyRow = sqlx::query_as(&sql)
            .bind(new_id())
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.location)
            .bind(draft.price)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_property(&self, id: Uuid) -> Result<Property, HomepageError> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM property WHERE id = $1");
        sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Property::from)
            .ok_or(HomepageError::NotFound {
                kind: ItemKind::Property,
                id,
            })
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_properties(&self, filter: ListFilter) -> Result<Vec<Property>, HomepageError> {
        let sql = format!(
            "SELECT {PROPERTY_COLUMNS} FROM property \
             WHERE ($1::BOOLEAN IS NULL OR is_on_home_page = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<PropertyRow> = sqlx::query_as(&sql)
            .bind(filter.on_home_page)
            .bind(i64::from(filter.limit))
            .bind(i64::from(filter.offset))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Property::from).collect())
    }

    #[tracing::instrument(skip(self), err)]
    async fn update_property(
        &self,
        id: Uuid,
        draft: PropertyDraft,
    ) -> Result<Property, HomepageError> {
        let sql = format!(
            "UPDATE property \
             SET title = $2, description = $3, location = $4, price = $5, updated_at = now() \
             WHERE id = $1 RETURNING {PROPERTY_COLUMNS}"
        );
        sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.location)
            .bind(draft.price)
            .fetch_optional(&self.pool)
            .await?
            .map(Property::from)
            .ok_or(HomepageError::NotFound {
                kind: ItemKind::Property,
                id,
            })
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_property(&self, id: Uuid) -> Result<(), HomepageError> {
        let result = sqlx::query("DELETE FROM property WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HomepageError::NotFound {
                kind: ItemKind::Property,
                id,
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    async fn create_blog(&self, draft: BlogDraft) -> Result<Blog, HomepageError> {
        let sql = format!(
            "INSERT INTO blog (id, title, author, content) \
             VALUES ($1, $2, $3, $4) RETURNING {BLOG_COLUMNS}"
        );
        let row: BlogRow = sqlx::query_as(&sql)
            .bind(new_id())
            .bind(&draft.title)
            .bind(&draft.author)
            .bind(&draft.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_blog(&self, id: Uuid) -> Result<Blog, HomepageError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog WHERE id = $1");
        sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Blog::from)
            .ok_or(HomepageError::NotFound {
                kind: ItemKind::Blog,
                id,
            })
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_blogs(&self, filter: ListFilter) -> Result<Vec<Blog>, HomepageError> {
        let sql = format!(
            "SELECT {BLOG_COLUMNS} FROM blog \
             WHERE ($1::BOOLEAN IS NULL OR is_on_home_page = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<BlogRow> = sqlx::query_as(&sql)
            .bind(filter.on_home_page)
            .bind(i64::from(filter.limit))
            .bind(i64::from(filter.offset))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Blog::from).collect())
    }

    #[tracing::instrument(skip(self), err)]
    async fn update_blog(&self, id: Uuid, draft: BlogDraft) -> Result<Blog, HomepageError> {
        let sql = format!(
            "UPDATE blog SET title = $2, author = $3, content = $4, updated_at = now() \
             WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        );
        sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.author)
            .bind(&draft.content)
            .fetch_optional(&self.pool)
            .await?
            .map(Blog::from)
            .ok_or(HomepageError::NotFound {
                kind: ItemKind::Blog,
                id,
            })
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_blog(&self, id: Uuid) -> Result<(), HomepageError> {
        let result = sqlx::query("DELETE FROM blog WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HomepageError::NotFound {
                kind: ItemKind::Blog,
                id,
            });
        }
        Ok(())
    }
}

impl FeaturedRepository for ListingsPgRepo {
    #[tracing::instrument(skip(self), err)]
    async fn feature_within_capacity(
        &self,
        kind: ItemKind,
        id: Uuid,
        capacity: u32,
    ) -> Result<FeatureOutcome, HomepageError> {
        let table = kind.table_name();
        let mut transaction = self.pool.begin().await?;

        // released on commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(lock_key(kind))
            .execute(&mut *transaction)
            .await?;

        // the row lock makes a concurrent delete either finish first or wait for us
        let select = format!("SELECT {HOMEPAGE_COLUMNS} FROM {table} WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, HomepageRow>(&select)
            .bind(id)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or(HomepageError::NotFound { kind, id })?;

        if current.is_on_home_page {
            transaction.commit().await?;
            return Ok(FeatureOutcome::AlreadyFeatured(current.into_item(kind)));
        }

        let count = format!("SELECT count(*) FROM {table} WHERE is_on_home_page");
        let featured: i64 = sqlx::query_scalar(&count)
            .fetch_one(&mut *transaction)
            .await?;

        if featured >= i64::from(capacity) {
            transaction.rollback().await?;
            return Ok(FeatureOutcome::AtCapacity {
                featured: u32::try_from(featured).unwrap_or(u32::MAX),
            });
        }

        let update = format!(
            "UPDATE {table} SET is_on_home_page = true, featured_at = now(), updated_at = now() \
             WHERE id = $1 RETURNING {HOMEPAGE_COLUMNS}"
        );
        let item = sqlx::query_as::<_, HomepageRow>(&update)
            .bind(id)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or(HomepageError::NotFound { kind, id })?;

        transaction.commit().await?;

        Ok(FeatureOutcome::Featured(item.into_item(kind)))
    }

    #[tracing::instrument(skip(self), err)]
    async fn unfeature(&self, kind: ItemKind, id: Uuid) -> Result<HomepageItem, HomepageError> {
        let table = kind.table_name();
        let sql = format!(
            "UPDATE {table} \
             SET is_on_home_page = false, \
                 featured_at = NULL, \
                 updated_at = CASE WHEN is_on_home_page THEN now() ELSE updated_at END \
             WHERE id = $1 RETURNING {HOMEPAGE_COLUMNS}"
        );
        sqlx::query_as::<_, HomepageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.into_item(kind))
            .ok_or(HomepageError::NotFound { kind, id })
    }

    #[tracing::instrument(skip(self), err)]
    async fn count_featured(&self, kind: ItemKind) -> Result<u32, HomepageError> {
        let sql = format!(
            "SELECT count(*) FROM {} WHERE is_on_home_page",
            kind.table_name()
        );
        let featured: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        u32::try_from(featured).map_err(|e| HomepageError::StorageLayerError(e.into()))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_featured(&self, kind: ItemKind) -> Result<Vec<HomepageItem>, HomepageError> {
        let sql = format!(
            "SELECT {HOMEPAGE_COLUMNS} FROM {} WHERE is_on_home_page \
             ORDER BY featured_at DESC, id DESC",
            kind.table_name()
        );
        let rows: Vec<HomepageRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|row| row.into_item(kind)).collect())
    }
}
