//! Contains the service logic for homepage listings

use uuid::Uuid;

use crate::domain::{
    model::{
        Blog, BlogDraft, FeatureOutcome, FeaturedSetPolicy, Homepage, HomepageError,
        HomepageItem, HomepageSlots, ItemKind, ListFilter, Property, PropertyDraft,
    },
    ports::{FeaturedRepository, HomepageService, ListingRepository},
};


/// Implementation of the HomepageService using a ListingRepository and a FeaturedRepository
#[derive(Debug, Clone)]
pub struct HomepageServiceImpl<LR, FR>
where
    LR: ListingRepository,
    FR: FeaturedRepository,
{
    /// The underlying listing repository
    listing_repository: LR,
    /// The underlying featured flag repository
    featured_repository: FR,
    /// Capacities per kind
    policy: FeaturedSetPolicy,
}

impl<LR, FR> HomepageServiceImpl<LR, FR>
where
    LR: ListingRepository,
    FR: FeaturedRepository,
{
    /// Creates a new HomepageService
    pub fn new(listing_repository: LR, featured_repository: FR, policy: FeaturedSetPolicy) -> Self {
        Self {
            listing_repository,
            featured_repository,
            policy,
        }
    }
}

impl<LR, FR> HomepageService for HomepageServiceImpl<LR, FR>
where
    LR: ListingRepository,
    FR: FeaturedRepository,
{
    #[tracing::instrument(skip(self), err)]
    async fn add_to_featured(&self, kind: ItemKind, id: Uuid) -> Result<HomepageItem, HomepageError> {
        let capacity = self.policy.capacity(kind);

        match self
            .featured_repository
            .feature_within_capacity(kind, id, capacity)
            .await?
        {
            FeatureOutcome::Featured(item) => {
                tracing::info!(%kind, %id, "item added to homepage");
                Ok(item)
            }
            FeatureOutcome::AlreadyFeatured(item) => {
                tracing::debug!(%kind, %id, "item already on homepage");
                Ok(item)
            }
            FeatureOutcome::AtCapacity { featured } => {
                tracing::warn!(%kind, %id, featured, capacity, "homepage is full");
                Err(HomepageError::CapacityExceeded { kind, capacity })
            }
        }
    }

    #[tracing::instrument(skip(self), err)]
    async fn remove_from_featured(
        &self,
        kind: ItemKind,
        id: Uuid,
    ) -> Result<HomepageItem, HomepageError> {
        let item = self.featured_repository.unfeature(kind, id).await?;
        tracing::info!(%kind, %id, "item removed from homepage");
        Ok(item)
    }

    async fn set_featured(
        &self,
        kind: ItemKind,
        id: Uuid,
        is_on_home_page: bool,
    ) -> Result<HomepageItem, HomepageError> {
        if is_on_home_page {
            self.add_to_featured(kind, id).await
        } else {
            self.remove_from_featured(kind, id).await
        }
    }

    async fn list_featured(&self, kind: ItemKind) -> Result<Vec<HomepageItem>, HomepageError> {
        self.featured_repository.list_featured(kind).await
    }

    async fn homepage(&self) -> Result<Homepage, HomepageError> {
        let properties = self
            .featured_repository
            .list_featured(ItemKind::Property)
            .await?;
        let blogs = self.featured_repository.list_featured(ItemKind::Blog).await?;

        Ok(Homepage { properties, blogs })
    }

    async fn slots(&self) -> Result<Vec<HomepageSlots>, HomepageError> {
        let mut slots = Vec::with_capacity(ItemKind::ALL.len());
        for kind in ItemKind::ALL {
            let featured = self.featured_repository.count_featured(kind).await?;
            slots.push(HomepageSlots {
                kind,
                featured,
                capacity: self.policy.capacity(kind),
            });
        }
        Ok(slots)
    }

    async fn create_property(&self, draft: PropertyDraft) -> Result<Property, HomepageError> {
        draft.validate().map_err(HomepageError::Validation)?;
        let property = self.listing_repository.create_property(draft).await?;
        tracing::info!(id = %property.id, "property created");
        Ok(property)
    }

    async fn get_property(&self, id: Uuid) -> Result<Property, HomepageError> {
        self.listing_repository.get_property(id).await
    }

    async fn list_properties(&self, filter: ListFilter) -> Result<Vec<Property>, HomepageError> {
        self.listing_repository.list_properties(filter).await
    }

    async fn update_property(
        &self,
        id: Uuid,
        draft: PropertyDraft,
    ) -> Result<Property, HomepageError> {
        draft.validate().map_err(HomepageError::Validation)?;
        self.listing_repository.update_property(id, draft).await
    }

    async fn delete_property(&self, id: Uuid) -> Result<(), HomepageError> {
        self.listing_repository.delete_property(id).await?;
        tracing::info!(%id, "property deleted");
        Ok(())
    }

    async fn create_blog(&self, draft: BlogDraft) -> Result<Blog, HomepageError> {
        draft.validate().map_err(HomepageError::Validation)?;
        let blog = self.listing_repository.create_blog(draft).await?;
        tracing::info!(id = %blog.id, "blog created");
        Ok(blog)
    }

    async fn get_blog(&self, id: Uuid) -> Result<Blog, HomepageError> {
        self.listing_repository.get_blog(id).await
    }

    async fn list_blogs(&self, filter: ListFilter) -> Result<Vec<Blog>, HomepageError> {
        self.listing_repository.list_blogs(filter).await
    }

    async fn update_blog(&self, id: Uuid, draft: BlogDraft) -> Result<Blog, HomepageError> {
        draft.validate().map_err(HomepageError::Validation)?;
        self.listing_repository.update_blog(id, draft).await
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), HomepageError> {
        self.listing_repository.delete_blog(id).await?;
        tracing::info!(%id, "blog deleted");
        Ok(())
    }
}
