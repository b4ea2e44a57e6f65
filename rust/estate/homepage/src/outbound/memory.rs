//! In process implementation of the listing and featured repositories.
//! Every operation runs under one mutex, so the capacity check and the flip are atomic.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::{
    model::{
        Blog, BlogDraft, FeatureOutcome, Featurable, HomepageError, HomepageItem, ItemKind,
        ListFilter, Property, PropertyDraft,
    },
    ports::{FeaturedRepository, ListingRepository},
};

#[derive(Debug, Default)]
struct Listings {
    properties: HashMap<Uuid, Property>,
    blogs: HashMap<Uuid, Blog>,
}

/// Listings held in memory, cheap to clone and shared between clones
#[derive(Debug, Clone, Default)]
pub struct InMemoryListings {
    inner: Arc<Mutex<Listings>>,
}

impl InMemoryListings {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn with_listings<T>(
        &self,
        f: impl FnOnce(&mut Listings) -> Result<T, HomepageError>,
    ) -> Result<T, HomepageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| HomepageError::StorageLayerError(anyhow::anyhow!("listings lock poisoned")))?;
        f(&mut guard)
    }
}

fn new_id() -> Uuid {
    Uuid::new_v7(Timestamp::now(NoContext))
}

fn not_found(kind: ItemKind, id: Uuid) -> HomepageError {
    HomepageError::NotFound { kind, id }
}

fn page<T: Clone>(
    items: &HashMap<Uuid, T>,
    filter: ListFilter,
    featured: impl Fn(&T) -> bool,
    newest_first: impl Fn(&T, &T) -> std::cmp::Ordering,
) -> Vec<T> {
    let mut matching: Vec<T> = items
        .values()
        .filter(|item| filter.on_home_page.is_none_or(|wanted| featured(*item) == wanted))
        .cloned()
        .collect();
    matching.sort_by(|a, b| newest_first(a, b));
    matching
        .into_iter()
        .skip(filter.offset as usize)
        .take(filter.limit as usize)
        .collect()
}

fn feature_in<T: Featurable>(
    items: &mut HashMap<Uuid, T>,
    id: Uuid,
    capacity: u32,
) -> Result<FeatureOutcome, HomepageError> {
    let item = items.get(&id).ok_or_else(|| not_found(T::KIND, id))?;
    if item.is_on_home_page() {
        return Ok(FeatureOutcome::AlreadyFeatured(item.to_homepage_item()));
    }

    let featured = items.values().filter(|i| i.is_on_home_page()).count() as u32;
    if featured >= capacity {
        return Ok(FeatureOutcome::AtCapacity { featured });
    }

    let item = items.get_mut(&id).ok_or_else(|| not_found(T::KIND, id))?;
    item.set_on_home_page(true, Utc::now());
    Ok(FeatureOutcome::Featured(item.to_homepage_item()))
}

fn unfeature_in<T: Featurable>(
    items: &mut HashMap<Uuid, T>,
    id: Uuid,
) -> Result<HomepageItem, HomepageError> {
    let item = items.get_mut(&id).ok_or_else(|| not_found(T::KIND, id))?;
    item.set_on_home_page(false, Utc::now());
    Ok(item.to_homepage_item())
}

fn featured_in<T: Featurable>(items: &HashMap<Uuid, T>) -> Vec<HomepageItem> {
    let mut featured: Vec<HomepageItem> = items
        .values()
        .filter(|i| i.is_on_home_page())
        .map(Featurable::to_homepage_item)
        .collect();
    featured.sort_by(|a, b| b.featured_at.cmp(&a.featured_at).then(b.id.cmp(&a.id)));
    featured
}

impl ListingRepository for InMemoryListings {
    async fn create_property(&self, draft: PropertyDraft) -> Result<Property, HomepageError> {
        let now = Utc::now();
        let property = Property {
            id: new_id(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            price: draft.price,
            is_on_home_page: false,
            featured_at: None,
            created_at: now,
            updated_at: now,
        };
        self.with_listings(|l| {
            l.properties.insert(property.id, property.clone());
            Ok(property)
        })
    }

    async fn get_property(&self, id: Uuid) -> Result<Property, HomepageError> {
        self.with_listings(|l| {
            l.properties
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found(ItemKind::Property, id))
        })
    }

    async fn list_properties(&self, filter: ListFilter) -> Result<Vec<Property>, HomepageError> {
        self.with_listings(|l| {
            Ok(page(
                &l.properties,
                filter,
                |p| p.is_on_home_page,
                |a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            ))
        })
    }

    async fn update_property(
        &self,
        id: Uuid,
        draft: PropertyDraft,
    ) -> Result<Property, HomepageError> {
        self.with_listings(|l| {
            let property = l
                .properties
                .get_mut(&id)
                .ok_or_else(|| not_found(ItemKind::Property, id))?;
            property.title = draft.title;
            property.description = draft.description;
            property.location = draft.location;
            property.price = draft.price;
            property.updated_at = Utc::now();
            Ok(property.clone())
        })
    }

    async fn delete_property(&self, id: Uuid) -> Result<(), HomepageError> {
        self.with_listings(|l| {
            l.properties
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| not_found(ItemKind::Property, id))
        })
    }

    async fn create_blog(&self, draft: BlogDraft) -> Result<Blog, HomepageError> {
        let now = Utc::now();
        let blog = Blog {
            id: new_id(),
            title: draft.title,
            author: draft.author,
            content: draft.content,
            is_on_home_page: false,
            featured_at: None,
            created_at: now,
            updated_at: now,
        };
        self.with_listings(|l| {
            l.blogs.insert(blog.id, blog.clone());
            Ok(blog)
        })
    }

    async fn get_blog(&self, id: Uuid) -> Result<Blog, HomepageError> {
        self.with_listings(|l| {
            l.blogs
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found(ItemKind::Blog, id))
        })
    }

    async fn list_blogs(&self, filter: ListFilter) -> Result<Vec<Blog>, HomepageError> {
        self.with_listings(|l| {
            Ok(page(
                &l.blogs,
                filter,
                |b| b.is_on_home_page,
                |a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            ))
        })
    }

    async fn update_blog(&self, id: Uuid, draft: BlogDraft) -> Result<Blog, HomepageError> {
        self.with_listings(|l| {
            let blog = l
                .blogs
                .get_mut(&id)
                .ok_or_else(|| not_found(ItemKind::Blog, id))?;
            blog.title = draft.title;
            blog.author = draft.author;
            blog.content = draft.content;
            blog.updated_at = Utc::now();
            Ok(blog.clone())
        })
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), HomepageError> {
        self.with_listings(|l| {
            l.blogs
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| not_found(ItemKind::Blog, id))
        })
    }
}

impl FeaturedRepository for InMemoryListings {
    async fn feature_within_capacity(
        &self,
        kind: ItemKind,
        id: Uuid,
        capacity: u32,
    ) -> Result<FeatureOutcome, HomepageError> {
        self.with_listings(|l| match kind {
            ItemKind::Property => feature_in(&mut l.properties, id, capacity),
            ItemKind::Blog => feature_in(&mut l.blogs, id, capacity),
        })
    }

    async fn unfeature(&self, kind: ItemKind, id: Uuid) -> Result<HomepageItem, HomepageError> {
        self.with_listings(|l| match kind {
            ItemKind::Property => unfeature_in(&mut l.properties, id),
            ItemKind::Blog => unfeature_in(&mut l.blogs, id),
        })
    }

    async fn count_featured(&self, kind: ItemKind) -> Result<u32, HomepageError> {
        self.with_listings(|l| {
            let count = match kind {
                ItemKind::Property => l.properties.values().filter(|p| p.is_on_home_page).count(),
                ItemKind::Blog => l.blogs.values().filter(|b| b.is_on_home_page).count(),
            };
            Ok(count as u32)
        })
    }

    async fn list_featured(&self, kind: ItemKind) -> Result<Vec<HomepageItem>, HomepageError> {
        self.with_listings(|l| {
            Ok(match kind {
                ItemKind::Property => featured_in(&l.properties),
                ItemKind::Blog => featured_in(&l.blogs),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog_draft(title: &str) -> BlogDraft {
        BlogDraft {
            title: title.to_string(),
            author: "Dana".to_string(),
            content: String::new(),
        }
    }

    #[tokio::test]
    async fn feature_within_capacity_stops_at_capacity() -> anyhow::Result<()> {
        let store = InMemoryListings::new();
        let first = store.create_blog(blog_draft("first")).await?;
        let second = store.create_blog(blog_draft("second")).await?;

        let outcome = store
            .feature_within_capacity(ItemKind::Blog, first.id, 1)
            .await?;
        assert!(matches!(outcome, FeatureOutcome::Featured(ref i) if i.id == first.id));

        let outcome = store
            .feature_within_capacity(ItemKind::Blog, first.id, 1)
            .await?;
        assert!(matches!(outcome, FeatureOutcome::AlreadyFeatured(_)));

        let outcome = store
            .feature_within_capacity(ItemKind::Blog, second.id, 1)
            .await?;
        assert_eq!(outcome, FeatureOutcome::AtCapacity { featured: 1 });
        assert!(!store.get_blog(second.id).await?.is_on_home_page);

        Ok(())
    }

    #[tokio::test]
    async fn kinds_do_not_share_capacity() -> anyhow::Result<()> {
        let store = InMemoryListings::new();
        let blog = store.create_blog(blog_draft("post")).await?;
        let property = store
            .create_property(PropertyDraft {
                title: "loft".to_string(),
                description: String::new(),
                location: String::new(),
                price: 1,
            })
            .await?;

        store
            .feature_within_capacity(ItemKind::Blog, blog.id, 1)
            .await?;
        let outcome = store
            .feature_within_capacity(ItemKind::Property, property.id, 1)
            .await?;
        assert!(matches!(outcome, FeatureOutcome::Featured(_)));
        assert_eq!(store.count_featured(ItemKind::Blog).await?, 1);
        assert_eq!(store.count_featured(ItemKind::Property).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn wrong_kind_is_not_found() -> anyhow::Result<()> {
        let store = InMemoryListings::new();
        let blog = store.create_blog(blog_draft("post")).await?;

        let err = store
            .feature_within_capacity(ItemKind::Property, blog.id, 8)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HomepageError::NotFound {
                kind: ItemKind::Property,
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_pages() -> anyhow::Result<()> {
        let store = InMemoryListings::new();
        let mut ids = Vec::new();
        for title in ["a", "b", "c", "d"] {
            ids.push(store.create_blog(blog_draft(title)).await?.id);
        }
        store.feature_within_capacity(ItemKind::Blog, ids[0], 3).await?;

        let featured = store
            .list_blogs(ListFilter::new(Some(true), None, None))
            .await?;
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].id, ids[0]);

        let not_featured = store
            .list_blogs(ListFilter::new(Some(false), None, None))
            .await?;
        assert_eq!(not_featured.len(), 3);

        let second_page = store.list_blogs(ListFilter::new(None, Some(3), Some(3))).await?;
        assert_eq!(second_page.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn editing_a_featured_item_keeps_its_place() -> anyhow::Result<()> {
        let store = InMemoryListings::new();
        let mut ids = Vec::new();
        for title in ["first", "second", "third"] {
            let blog = store.create_blog(blog_draft(title)).await?;
            store.feature_within_capacity(ItemKind::Blog, blog.id, 3).await?;
            ids.push(blog.id);
        }
        let order = |items: Vec<HomepageItem>| items.into_iter().map(|i| i.id).collect::<Vec<_>>();
        let before = order(store.list_featured(ItemKind::Blog).await?);

        store.update_blog(ids[0], blog_draft("first, edited")).await?;

        assert_eq!(order(store.list_featured(ItemKind::Blog).await?), before);
        Ok(())
    }

    #[tokio::test]
    async fn delete_takes_the_flag_with_it() -> anyhow::Result<()> {
        let store = InMemoryListings::new();
        let blog = store.create_blog(blog_draft("post")).await?;
        store.feature_within_capacity(ItemKind::Blog, blog.id, 3).await?;

        store.delete_blog(blog.id).await?;

        assert_eq!(store.count_featured(ItemKind::Blog).await?, 0);
        assert!(store.list_featured(ItemKind::Blog).await?.is_empty());
        Ok(())
    }
}
