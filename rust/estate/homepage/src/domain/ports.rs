//! Contains the ports for homepage listings

use uuid::Uuid;

use crate::domain::model::{
    Blog, BlogDraft, FeatureOutcome, Homepage, HomepageError, HomepageItem, HomepageSlots,
    ItemKind, ListFilter, Property, PropertyDraft,
};

/// The ListingRepository defines the crud actions on properties and blogs
pub trait ListingRepository: Clone + Send + Sync + 'static {
    /// Stores a new property, never featured
    fn create_property(
        &self,
        draft: PropertyDraft,
    ) -> impl Future<Output = Result<Property, HomepageError>> + Send;

    /// Gets a property by id
    fn get_property(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Property, HomepageError>> + Send;

    /// Lists properties, newest first
    fn list_properties(
        &self,
        filter: ListFilter,
    ) -> impl Future<Output = Result<Vec<Property>, HomepageError>> + Send;

    /// Replaces the editable fields of a property, leaving the featured flag alone
    fn update_property(
        &self,
        id: Uuid,
        draft: PropertyDraft,
    ) -> impl Future<Output = Result<Property, HomepageError>> + Send;

    /// Deletes a property, its featured flag goes with it
    fn delete_property(&self, id: Uuid) -> impl Future<Output = Result<(), HomepageError>> + Send;

    /// Stores a new blog, never featured
    fn create_blog(
        &self,
        draft: BlogDraft,
    ) -> impl Future<Output = Result<Blog, HomepageError>> + Send;

    /// Gets a blog by id
    fn get_blog(&self, id: Uuid) -> impl Future<Output = Result<Blog, HomepageError>> + Send;

    /// Lists blogs, newest first
    fn list_blogs(
        &self,
        filter: ListFilter,
    ) -> impl Future<Output = Result<Vec<Blog>, HomepageError>> + Send;

    /// Replaces the editable fields of a blog, leaving the featured flag alone
    fn update_blog(
        &self,
        id: Uuid,
        draft: BlogDraft,
    ) -> impl Future<Output = Result<Blog, HomepageError>> + Send;

    /// Deletes a blog, its featured flag goes with it
    fn delete_blog(&self, id: Uuid) -> impl Future<Output = Result<(), HomepageError>> + Send;
}

/// The FeaturedRepository owns the featured flag.
/// Implementations must perform the capacity check and the flip as one atomic step.
pub trait FeaturedRepository: Clone + Send + Sync + 'static {
    /// Features the item unless `capacity` items of its kind are already featured.
    /// Returns [HomepageError::NotFound] if the item does not exist.
    fn feature_within_capacity(
        &self,
        kind: ItemKind,
        id: Uuid,
        capacity: u32,
    ) -> impl Future<Output = Result<FeatureOutcome, HomepageError>> + Send;

    /// Clears the featured flag. Succeeds when the flag is already clear.
    fn unfeature(
        &self,
        kind: ItemKind,
        id: Uuid,
    ) -> impl Future<Output = Result<HomepageItem, HomepageError>> + Send;

    /// Counts the featured items of a kind
    fn count_featured(
        &self,
        kind: ItemKind,
    ) -> impl Future<Output = Result<u32, HomepageError>> + Send;

    /// Lists the featured items of a kind, most recently updated first
    fn list_featured(
        &self,
        kind: ItemKind,
    ) -> impl Future<Output = Result<Vec<HomepageItem>, HomepageError>> + Send;
}

/// The HomepageService defines the actions available to the public site and the admin dashboard
pub trait HomepageService: Clone + Send + Sync + 'static {
    /// Puts an item on the homepage.
    /// Fails with [HomepageError::CapacityExceeded] when its kind is full.
    /// Adding an item that is already featured succeeds without consulting the capacity.
    fn add_to_featured(
        &self,
        kind: ItemKind,
        id: Uuid,
    ) -> impl Future<Output = Result<HomepageItem, HomepageError>> + Send;

    /// Takes an item off the homepage, a no-op when it is not featured
    fn remove_from_featured(
        &self,
        kind: ItemKind,
        id: Uuid,
    ) -> impl Future<Output = Result<HomepageItem, HomepageError>> + Send;

    /// Moves an item to the desired featured state
    fn set_featured(
        &self,
        kind: ItemKind,
        id: Uuid,
        is_on_home_page: bool,
    ) -> impl Future<Output = Result<HomepageItem, HomepageError>> + Send;

    /// The featured items of one kind
    fn list_featured(
        &self,
        kind: ItemKind,
    ) -> impl Future<Output = Result<Vec<HomepageItem>, HomepageError>> + Send;

    /// Everything featured, grouped by kind
    fn homepage(&self) -> impl Future<Output = Result<Homepage, HomepageError>> + Send;

    /// Slot usage for every kind
    fn slots(&self) -> impl Future<Output = Result<Vec<HomepageSlots>, HomepageError>> + Send;

    /// Creates a property
    fn create_property(
        &self,
        draft: PropertyDraft,
    ) -> impl Future<Output = Result<Property, HomepageError>> + Send;

    /// Gets a property
    fn get_property(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Property, HomepageError>> + Send;

    /// Lists properties
    fn list_properties(
        &self,
        filter: ListFilter,
    ) -> impl Future<Output = Result<Vec<Property>, HomepageError>> + Send;

    /// Updates a property
    fn update_property(
        &self,
        id: Uuid,
        draft: PropertyDraft,
    ) -> impl Future<Output = Result<Property, HomepageError>> + Send;

    /// Deletes a property
    fn delete_property(&self, id: Uuid) -> impl Future<Output = Result<(), HomepageError>> + Send;

    /// Creates a blog
    fn create_blog(
        &self,
        draft: BlogDraft,
    ) -> impl Future<Output = Result<Blog, HomepageError>> + Send;

    /// Gets a blog
    fn get_blog(&self, id: Uuid) -> impl Future<Output = Result<Blog, HomepageError>> + Send;

    /// Lists blogs
    fn list_blogs(
        &self,
        filter: ListFilter,
    ) -> impl Future<Output = Result<Vec<Blog>, HomepageError>> + Send;

    /// Updates a blog
    fn update_blog(
        &self,
        id: Uuid,
        draft: BlogDraft,
    ) -> impl Future<Output = Result<Blog, HomepageError>> + Send;

    /// Deletes a blog
    fn delete_blog(&self, id: Uuid) -> impl Future<Output = Result<(), HomepageError>> + Send;
}
