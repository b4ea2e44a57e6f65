//! Contains the models for homepage listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;


/// Maximum number of properties on the homepage at once
pub const DEFAULT_PROPERTY_CAPACITY: u32 = 8;
/// Maximum number of blogs on the homepage at once
pub const DEFAULT_BLOG_CAPACITY: u32 = 3;
/// Longest title accepted for any listing
pub const MAX_TITLE_LEN: usize = 200;
/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest page size a caller may ask for
pub const MAX_PAGE_LIMIT: u32 = 100;

/// The kinds of listing which can be placed on the homepage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// a property for sale or rent
    Property,
    /// a blog post
    Blog,
}

impl ItemKind {
    /// every kind, in the order they are shown on the homepage
    pub const ALL: [ItemKind; 2] = [ItemKind::Property, ItemKind::Blog];

    /// the table backing this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            ItemKind::Property => "property",
            ItemKind::Blog => "blog",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Property => write!(f, "property"),
            ItemKind::Blog => write!(f, "blog"),
        }
    }
}

/// The maximum number of featured items allowed per [ItemKind]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedSetPolicy {
    property: u32,
    blog: u32,
}

impl Default for FeaturedSetPolicy {
    fn default() -> Self {
        Self {
            property: DEFAULT_PROPERTY_CAPACITY,
            blog: DEFAULT_BLOG_CAPACITY,
        }
    }
}

impl FeaturedSetPolicy {
    /// Creates a policy with explicit capacities
    pub fn new(property: u32, blog: u32) -> Self {
        Self { property, blog }
    }

    /// The capacity for the given kind
    pub fn capacity(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Property => self.property,
            ItemKind::Blog => self.blog,
        }
    }
}

/// A property listing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Property {
    /// The id of the property
    pub id: Uuid,
    /// The headline shown on cards
    pub title: String,
    /// Long form description
    pub description: String,
    /// Human readable location
    pub location: String,
    /// Asking price in minor currency units
    pub price: i64,
    /// Whether the property is featured on the homepage
    pub is_on_home_page: bool,
    /// When the property was last placed on the homepage, unset while not featured
    pub featured_at: Option<DateTime<Utc>>,
    /// When the property was created
    pub created_at: DateTime<Utc>,
    /// When the property was last modified
    pub updated_at: DateTime<Utc>,
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Blog {
    /// The id of the blog
    pub id: Uuid,
    /// The headline of the post
    pub title: String,
    /// Who wrote the post
    pub author: String,
    /// The post body
    pub content: String,
    /// Whether the blog is featured on the homepage
    pub is_on_home_page: bool,
    /// When the blog was last placed on the homepage, unset while not featured
    pub featured_at: Option<DateTime<Utc>>,
    /// When the blog was created
    pub created_at: DateTime<Utc>,
    /// When the blog was last modified
    pub updated_at: DateTime<Utc>,
}

/// The editable fields of a [Property]. Used for both create and update.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct PropertyDraft {
    /// The headline shown on cards
    pub title: String,
    /// Long form description
    #[serde(default)]
    pub description: String,
    /// Human readable location
    #[serde(default)]
    pub location: String,
    /// Asking price in minor currency units
    pub price: i64,
}

impl PropertyDraft {
    /// checks the draft can be stored
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        if self.price < 0 {
            return Err(format!("price must not be negative, got {}", self.price));
        }
        Ok(())
    }
}

/// The editable fields of a [Blog]. Used for both create and update.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct BlogDraft {
    /// The headline of the post
    pub title: String,
    /// Who wrote the post
    pub author: String,
    /// The post body
    #[serde(default)]
    pub content: String,
}

impl BlogDraft {
    /// checks the draft can be stored
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        if self.author.trim().is_empty() {
            return Err("author must not be empty".to_string());
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    Ok(())
}

/// Kind agnostic view of a listing as far as the homepage is concerned
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HomepageItem {
    /// The id of the listing
    pub id: Uuid,
    /// What sort of listing this is
    pub kind: ItemKind,
    /// The headline of the listing
    pub title: String,
    /// Whether the listing is featured
    pub is_on_home_page: bool,
    /// When the listing was placed on the homepage. Featured items are ordered by this
    pub featured_at: Option<DateTime<Utc>>,
    /// When the listing was last modified
    pub updated_at: DateTime<Utc>,
}

/// Something which can be placed on the homepage
pub trait Featurable {
    /// The kind of the listing
    const KIND: ItemKind;

    /// The id of the listing
    fn id(&self) -> Uuid;

    /// Whether the listing is currently featured
    fn is_on_home_page(&self) -> bool;

    /// Flips the featured flag, touching `updated_at` and `featured_at` only when the flag changes
    fn set_on_home_page(&mut self, value: bool, now: DateTime<Utc>);

    /// The homepage view of this listing
    fn to_homepage_item(&self) -> HomepageItem;
}

impl Featurable for Property {
    const KIND: ItemKind = ItemKind::Property;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_on_home_page(&self) -> bool {
        self.is_on_home_page
    }

    fn set_on_home_page(&mut self, value: bool, now: DateTime<Utc>) {
        if self.is_on_home_page != value {
            self.is_on_home_page = value;
            self.featured_at = value.then_some(now);
            self.updated_at = now;
        }
    }

    fn to_homepage_item(&self) -> HomepageItem {
        HomepageItem {
            id: self.id,
            kind: Self::KIND,
            title: self.title.clone(),
            is_on_home_page: self.is_on_home_page,
            featured_at: self.featured_at,
            updated_at: self.updated_at,
        }
    }
}

impl Featurable for Blog {
    const KIND: ItemKind = ItemKind::Blog;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_on_home_page(&self) -> bool {
        self.is_on_home_page
    }

    fn set_on_home_page(&mut self, value: bool, now: DateTime<Utc>) {
        if self.is_on_home_page != value {
            self.is_on_home_page = value;
            self.featured_at = value.then_some(now);
            self.updated_at = now;
        }
    }

    fn to_homepage_item(&self) -> HomepageItem {
        HomepageItem {
            id: self.id,
            kind: Self::KIND,
            title: self.title.clone(),
            is_on_home_page: self.is_on_home_page,
            featured_at: self.featured_at,
            updated_at: self.updated_at,
        }
    }
}

/// Everything currently featured on the homepage
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Homepage {
    /// featured properties, most recently featured first
    pub properties: Vec<HomepageItem>,
    /// featured blogs, most recently featured first
    pub blogs: Vec<HomepageItem>,
}

/// How many homepage slots a kind has used.
/// Advisory only, the capacity is enforced when an item is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct HomepageSlots {
    /// The kind these slots belong to
    pub kind: ItemKind,
    /// How many items are featured right now
    pub featured: u32,
    /// How many items may be featured
    pub capacity: u32,
}

impl HomepageSlots {
    /// Slots still free
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.featured)
    }
}

/// Result of asking storage to feature an item within a capacity
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutcome {
    /// The flag was flipped
    Featured(HomepageItem),
    /// The item was already featured, nothing changed
    AlreadyFeatured(HomepageItem),
    /// The kind is full, nothing changed
    AtCapacity {
        /// the number of featured items observed under the lock
        featured: u32,
    },
}

/// Filter and page for listing properties or blogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    /// Only return listings whose featured flag matches
    pub on_home_page: Option<bool>,
    /// Page size, at most [MAX_PAGE_LIMIT]
    pub limit: u32,
    /// Number of listings to skip
    pub offset: u32,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            on_home_page: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl ListFilter {
    /// Builds a filter from optional caller input, clamping the limit into range
    pub fn new(on_home_page: Option<bool>, limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            on_home_page,
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Errors for homepage listings
#[derive(Debug, thiserror::Error)]
pub enum HomepageError {
    /// The kind already has as many featured items as it may
    #[error("homepage already shows the maximum of {capacity} {kind} items")]
    CapacityExceeded {
        /// the kind that is full
        kind: ItemKind,
        /// the capacity of that kind
        capacity: u32,
    },
    /// The listing does not exist
    #[error("{kind} {id} does not exist")]
    NotFound {
        /// the kind that was looked up
        kind: ItemKind,
        /// the id that was looked up
        id: Uuid,
    },
    /// The input was rejected
    #[error("validation error: {0}")]
    Validation(String),
    /// Storage layer error
    #[error("storage layer error: {0}")]
    StorageLayerError(#[from] anyhow::Error),
}
