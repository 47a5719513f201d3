//! Markup for each page and for the fragments re-rendered in place.
//!
//! Templates live in `templates/` and escape every interpolated value.

use askama::Template;
use cg_api_types::{CatalogItem, LoadoutEntry};

use crate::catalog::{Catalog, GridKind, GridPage};
use crate::router::ViewId;

pub const FEATURED_COUNT: usize = 4;

pub struct StatBox {
    pub value: &'static str,
    pub label: &'static str,
    pub glow: &'static str,
}

pub struct Skill {
    pub name: &'static str,
    pub level: u8,
}

pub struct FilterButton {
    pub value: &'static str,
    pub label: &'static str,
}

pub struct FormField {
    pub id: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub multiline: bool,
}

const STATS: &[StatBox] = &[
    StatBox { value: "UE5", label: "ENVIRONMENT & LOGIC", glow: "glitch-cyan" },
    StatBox { value: "C++", label: "CORE SYSTEMS", glow: "glitch-purple" },
    StatBox { value: "A.I.", label: "ASSISTED PIPELINE", glow: "glitch-cyan" },
];

const SKILLS: &[Skill] = &[
    Skill { name: "Unreal Engine 5", level: 90 },
    Skill { name: "C++", level: 85 },
    Skill { name: "AI/ML", level: 75 },
    Skill { name: "Python", level: 70 },
    Skill { name: "Blueprints", level: 95 },
];

const PRODUCT_FILTERS: &[FilterButton] = &[
    FilterButton { value: "all", label: "ALL" },
    FilterButton { value: "ue5", label: "UE5" },
    FilterButton { value: "cpp", label: "C++" },
    FilterButton { value: "ai", label: "A.I." },
];

const AI_FILTERS: &[FilterButton] = &[
    FilterButton { value: "all", label: "ALL" },
    FilterButton { value: "models", label: "MODELS" },
    FilterButton { value: "datasets", label: "DATASETS" },
    FilterButton { value: "tools", label: "TOOLS" },
];

/// Product form fields. The ids are what the admin page reads back.
pub const PRODUCT_FIELDS: &[FormField] = &[
    FormField { id: "product-title", label: "TITLE", input_type: "text", multiline: false },
    FormField { id: "product-category", label: "CATEGORY", input_type: "text", multiline: false },
    FormField { id: "product-tag", label: "TAG", input_type: "text", multiline: false },
    FormField { id: "product-img", label: "IMAGE PATH", input_type: "text", multiline: false },
    FormField { id: "product-desc", label: "DESCRIPTION", input_type: "text", multiline: true },
    FormField { id: "product-price", label: "PRICE", input_type: "number", multiline: false },
];

/// Element ids of a filterable grid page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIds {
    pub grid: &'static str,
    pub load_more: &'static str,
}

pub fn grid_ids(kind: GridKind) -> GridIds {
    match kind {
        GridKind::Products => GridIds {
            grid: "project-grid",
            load_more: "load-more-btn",
        },
        GridKind::AiProjects => GridIds {
            grid: "ai-grid",
            load_more: "load-more-ai-btn",
        },
    }
}

pub struct ModuleRow {
    pub id: String,
    pub index: String,
    pub title: String,
    pub desc: String,
}

pub struct CardRow {
    pub id: String,
    pub title: String,
    pub tag: String,
    pub img: String,
}

impl From<&CatalogItem> for CardRow {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.as_key(),
            title: item.title.clone(),
            tag: item.tag.clone(),
            img: item.img.clone(),
        }
    }
}

pub struct AdminRow {
    pub id: String,
    pub title: String,
    pub price: String,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeView<'a> {
    stats: &'a [StatBox],
    modules: Vec<ModuleRow>,
    featured: Vec<CardRow>,
    skills: &'a [Skill],
}

#[derive(Template)]
#[template(path = "grid_view.html")]
struct GridView<'a> {
    heading: &'a str,
    filters: &'a [FilterButton],
    grid_id: &'a str,
    load_more_id: &'a str,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactView;

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminView<'a> {
    fields: &'a [FormField],
}

#[derive(Template)]
#[template(path = "grid_cards.html")]
struct GridCards {
    cards: Vec<CardRow>,
    ai: bool,
}

#[derive(Template)]
#[template(path = "loadout_items.html")]
struct LoadoutItems<'a> {
    items: &'a [LoadoutEntry],
}

#[derive(Template)]
#[template(path = "admin_products.html")]
struct AdminProducts {
    rows: Vec<AdminRow>,
}

#[derive(Template)]
#[template(path = "init_failure.html")]
struct InitFailure<'a> {
    message: &'a str,
}

/// Page markup for a view. Grid pages render empty containers that the
/// per-view setup fills.
pub fn render_view(view: ViewId, catalog: &Catalog) -> askama::Result<String> {
    match view {
        ViewId::Home => HomeView {
            stats: STATS,
            modules: catalog
                .modules
                .iter()
                .enumerate()
                .map(|(idx, m)| ModuleRow {
                    id: m.id.as_key(),
                    index: format!("{:02}", idx + 1),
                    title: m.title.clone(),
                    desc: m.desc.clone(),
                })
                .collect(),
            featured: catalog.featured(FEATURED_COUNT).iter().map(CardRow::from).collect(),
            skills: SKILLS,
        }
        .render(),
        ViewId::AssetStore => grid_page(GridKind::Products).render(),
        ViewId::AiProjects => grid_page(GridKind::AiProjects).render(),
        ViewId::Contact => ContactView.render(),
        ViewId::Admin => AdminView {
            fields: PRODUCT_FIELDS,
        }
        .render(),
    }
}

fn grid_page(kind: GridKind) -> GridView<'static> {
    let ids = grid_ids(kind);
    let (heading, filters) = match kind {
        GridKind::Products => ("ASSET_STORE", PRODUCT_FILTERS),
        GridKind::AiProjects => ("AI_EXPERIMENTS", AI_FILTERS),
    };
    GridView {
        heading,
        filters,
        grid_id: ids.grid,
        load_more_id: ids.load_more,
    }
}

pub fn render_grid(kind: GridKind, page: &GridPage<'_>) -> askama::Result<String> {
    GridCards {
        cards: page.items.iter().map(|item| CardRow::from(*item)).collect(),
        ai: kind == GridKind::AiProjects,
    }
    .render()
}

pub fn render_loadout(items: &[LoadoutEntry]) -> askama::Result<String> {
    LoadoutItems { items }.render()
}

pub fn render_admin_products(products: &[CatalogItem]) -> askama::Result<String> {
    AdminProducts {
        rows: products
            .iter()
            .map(|p| AdminRow {
                id: p.id.as_key(),
                title: p.title.clone(),
                price: p.price.map(|price| price.to_string()).unwrap_or_else(|| "0".to_owned()),
            })
            .collect(),
    }
    .render()
}

/// Shown in place of the app when startup fails.
pub fn render_init_failure(message: &str) -> String {
    InitFailure { message }
        .render()
        .unwrap_or_else(|_| "⚠ SYSTEM INITIALIZATION FAILED".to_owned())
}
