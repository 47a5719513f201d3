//! Catalog loading, lookup, filtering and pagination.

mod fallback;

use cg_api_types::{CatalogItem, RecordId};
use cg_backend::{Backend, BackendResult};
use tracing::{info, warn};

pub use fallback::fallback_catalog;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub products: Vec<CatalogItem>,
    pub ai_projects: Vec<CatalogItem>,
    pub modules: Vec<CatalogItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Backend,
    Fallback,
}

impl Catalog {
    pub fn product(&self, id: &RecordId) -> Option<&CatalogItem> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn ai_project(&self, id: &RecordId) -> Option<&CatalogItem> {
        self.ai_projects.iter().find(|p| &p.id == id)
    }

    pub fn module(&self, id: &RecordId) -> Option<&CatalogItem> {
        self.modules.iter().find(|m| &m.id == id)
    }

    pub fn featured(&self, count: usize) -> &[CatalogItem] {
        &self.products[..count.min(self.products.len())]
    }

    pub fn items(&self, kind: GridKind) -> &[CatalogItem] {
        match kind {
            GridKind::Products => &self.products,
            GridKind::AiProjects => &self.ai_projects,
        }
    }
}

/// Fetch all three collections. Any failure replaces the whole catalog with
/// the built-in dataset; the error itself is only logged.
pub async fn load_catalog(backend: &dyn Backend) -> (Catalog, CatalogSource) {
    info!(target: "cg::catalog", "fetching catalog from backend");
    match fetch_all(backend).await {
        Ok(catalog) => {
            info!(
                target: "cg::catalog",
                products = catalog.products.len(),
                ai_projects = catalog.ai_projects.len(),
                modules = catalog.modules.len(),
                "catalog loaded from backend"
            );
            (catalog, CatalogSource::Backend)
        }
        Err(err) => {
            warn!(target: "cg::catalog", "backend fetch failed, using fallback data: {}", err);
            (fallback_catalog(), CatalogSource::Fallback)
        }
    }
}

async fn fetch_all(backend: &dyn Backend) -> BackendResult<Catalog> {
    let (products, ai_projects, modules) =
        futures::try_join!(backend.products(), backend.ai_projects(), backend.modules())?;
    Ok(Catalog {
        products,
        ai_projects,
        modules,
    })
}

/// The two filterable grids. They deliberately match categories differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    /// Product categories are space-separated lists ("ue5 cpp"), so a filter
    /// matches anywhere in the string.
    Products,
    /// AI project categories are single words and must match exactly.
    AiProjects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatch {
    Substring,
    Exact,
}

impl GridKind {
    pub fn category_match(self) -> CategoryMatch {
        match self {
            GridKind::Products => CategoryMatch::Substring,
            GridKind::AiProjects => CategoryMatch::Exact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Parse a `data-filter` value; `all` (or nothing) disables filtering.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(raw.to_owned())
        }
    }

    pub fn matches(&self, item: &CatalogItem, mode: CategoryMatch) -> bool {
        match (self, mode) {
            (CategoryFilter::All, _) => true,
            (CategoryFilter::Category(c), CategoryMatch::Substring) => item.category.contains(c.as_str()),
            (CategoryFilter::Category(c), CategoryMatch::Exact) => item.category == *c,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct GridPage<'a> {
    pub items: Vec<&'a CatalogItem>,
    /// Whether "load more" should stay visible.
    pub has_more: bool,
}

/// First `page * page_size` entries that pass the filter.
pub fn page_of<'a>(
    items: &'a [CatalogItem],
    filter: &CategoryFilter,
    mode: CategoryMatch,
    page: usize,
    page_size: usize,
) -> GridPage<'a> {
    let limit = page.max(1).saturating_mul(page_size);
    let matching: Vec<&CatalogItem> = items.iter().filter(|item| filter.matches(item, mode)).collect();
    let has_more = matching.len() > limit;
    GridPage {
        items: matching.into_iter().take(limit).collect(),
        has_more,
    }
}

/// Filter and page cursor of one grid view. Reset on every mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub kind: GridKind,
    pub filter: CategoryFilter,
    pub page: usize,
}

impl GridState {
    pub fn new(kind: GridKind) -> Self {
        Self {
            kind,
            filter: CategoryFilter::All,
            page: 1,
        }
    }

    pub fn select_filter(&mut self, raw: &str) {
        self.filter = CategoryFilter::parse(raw);
        self.page = 1;
    }

    pub fn load_more(&mut self) {
        self.page += 1;
    }

    pub fn view<'a>(&self, catalog: &'a Catalog, page_size: usize) -> GridPage<'a> {
        page_of(
            catalog.items(self.kind),
            &self.filter,
            self.kind.category_match(),
            self.page,
            page_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, item};
    use cg_backend::BackendError;

    fn ids(page: &GridPage<'_>) -> Vec<String> {
        page.items.iter().map(|i| i.id.as_key()).collect()
    }

    #[test]
    fn product_filter_matches_substrings() {
        let catalog = fallback_catalog();
        let mut grid = GridState::new(GridKind::Products);
        grid.select_filter("ai");
        let page = grid.view(&catalog, 9);
        let expected: Vec<String> = catalog
            .products
            .iter()
            .filter(|p| p.category.contains("ai"))
            .map(|p| p.id.as_key())
            .collect();
        assert_eq!(ids(&page), expected);
        assert_eq!(ids(&page), vec!["2", "4", "7", "9"]);
        assert!(!page.has_more);
    }

    #[test]
    fn ai_filter_requires_exact_category() {
        let catalog = fallback_catalog();
        let mut grid = GridState::new(GridKind::AiProjects);
        grid.select_filter("models");
        assert_eq!(ids(&grid.view(&catalog, 9)), vec!["101", "102", "104"]);

        // a prefix is not enough for the exact grid, but is for the substring grid
        grid.select_filter("model");
        assert!(grid.view(&catalog, 9).items.is_empty());
        let partial = page_of(&catalog.ai_projects, &CategoryFilter::parse("model"), CategoryMatch::Substring, 1, 9);
        assert_eq!(partial.items.len(), 3);
    }

    #[test]
    fn pagination_grows_by_page_and_hides_load_more_at_end() {
        let items: Vec<CatalogItem> = (1..=20).map(|n| item(n, "p", "cpp", "C++")).collect();
        let filter = CategoryFilter::All;

        let first = page_of(&items, &filter, CategoryMatch::Substring, 1, 9);
        assert_eq!(first.items.len(), 9);
        assert!(first.has_more);

        let second = page_of(&items, &filter, CategoryMatch::Substring, 2, 9);
        assert_eq!(second.items.len(), 18);
        assert!(second.has_more);

        let third = page_of(&items, &filter, CategoryMatch::Substring, 3, 9);
        assert_eq!(third.items.len(), 20);
        assert!(!third.has_more);

        let exact_fit = page_of(&items[..18], &filter, CategoryMatch::Substring, 2, 9);
        assert!(!exact_fit.has_more);
    }

    #[test]
    fn selecting_a_filter_resets_the_page() {
        let mut grid = GridState::new(GridKind::Products);
        grid.load_more();
        grid.load_more();
        assert_eq!(grid.page, 3);
        grid.select_filter("cpp");
        assert_eq!(grid.page, 1);
        assert_eq!(grid.filter, CategoryFilter::Category("cpp".into()));
        grid.select_filter("all");
        assert_eq!(grid.filter, CategoryFilter::All);
    }

    #[test]
    fn lookups_accept_string_ids() {
        let catalog = fallback_catalog();
        let id = RecordId::parse("5");
        assert_eq!(catalog.product(&id).map(|p| p.title.as_str()), Some("Physics Engine"));
        assert!(catalog.module(&RecordId::Text("201".into())).is_some());
        assert!(catalog.ai_project(&RecordId::Numeric(5)).is_none());
        assert_eq!(catalog.featured(4).len(), 4);
    }

    #[tokio::test]
    async fn backend_catalog_is_used_when_every_fetch_succeeds() {
        let backend = FakeBackend::default();
        backend.products.borrow_mut().push(item(1, "Only", "cpp", "C++"));
        let (catalog, source) = load_catalog(&backend).await;
        assert_eq!(source, CatalogSource::Backend);
        assert_eq!(catalog.products.len(), 1);
        assert!(catalog.modules.is_empty());
    }

    #[tokio::test]
    async fn collections_are_requested_together() {
        let backend = FakeBackend::default();
        backend.slow_products.set(true);
        let (_, source) = load_catalog(&backend).await;
        assert_eq!(source, CatalogSource::Backend);
        assert_eq!(
            backend.calls(),
            vec!["products", "ai_projects", "modules", "products:done"]
        );
    }

    #[tokio::test]
    async fn any_failed_fetch_substitutes_fallback_data() {
        let backend = FakeBackend::default();
        backend.products.borrow_mut().push(item(1, "Only", "cpp", "C++"));
        backend.fail("modules", BackendError::Network("offline".into()));
        let (catalog, source) = load_catalog(&backend).await;
        assert_eq!(source, CatalogSource::Fallback);
        assert_eq!(catalog, fallback_catalog());
        assert_eq!(catalog.products.len(), 9);
        assert_eq!(catalog.ai_projects.len(), 5);
        assert_eq!(catalog.modules.len(), 6);
    }
}
