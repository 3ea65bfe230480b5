//! Page metadata for the storefront: titles, descriptions, structured data,
//! breadcrumbs and the sitemap.
//!
//! Prices are formatted the Spanish way (`1234,50 €`, `12.345,00 €`).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::product::ProductDetail;
use crate::slug::generate_product_slug;
use crate::taxonomy::{TaxonomyChain, TaxonomyPath};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder-product.jpg";
const SHIPPING_PITCH: &str = "Compra online con envío rápido y seguro.";
const DESCRIPTION_BUDGET: usize = 155;

/// Group the integer part with dots. Four-digit amounts stay ungrouped.
fn group_thousands(units: u64) -> String {
    let digits = units.to_string();
    if digits.len() < 5 {
        return digits;
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Euro amount for display. The currency sign is separated by a
/// non-breaking space.
pub fn format_price(cents: u64) -> String {
    format!("{},{:02}\u{a0}€", group_thousands(cents / 100), cents % 100)
}

pub fn format_price_range(min: u64, max: u64) -> String {
    if min == max {
        format_price(min)
    } else {
        format!("{} - {}", format_price(min), format_price(max))
    }
}

/// Plain decimal amount as used in structured data (`"12.50"`).
pub fn decimal_amount(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Cut `text` to at most `max` characters, ending in `...` when shortened.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn listing_title(path: &TaxonomyPath) -> String {
    match path.most_specific() {
        Some(name) => format!("{name} | Productos"),
        None => "Catálogo de Productos".to_string(),
    }
}

pub fn listing_description(path: &TaxonomyPath, product_count: Option<usize>) -> String {
    let subject = path
        .most_specific()
        .map(str::to_lowercase)
        .unwrap_or_else(|| "productos".to_string());
    let offer = match product_count {
        Some(n) if n > 0 => format!("con {n} opciones disponibles."),
        _ => "con las mejores opciones para ti.".to_string(),
    };
    format!("Explora nuestro catálogo de {subject} {offer} {SHIPPING_PITCH}")
}

pub fn product_title(name: &str, price: u64) -> String {
    format!("{name} - {}", format_price(price))
}

/// Short description that stays within the search-snippet budget.
pub fn product_description(name: &str, detail: Option<&str>, price: u64) -> String {
    let base = format!("{name} por {}.", format_price(price));
    let clean = detail
        .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|d| !d.is_empty());
    let Some(clean) = clean else {
        return format!("{base} {SHIPPING_PITCH}");
    };

    let room = DESCRIPTION_BUDGET.saturating_sub(base.chars().count());
    if clean.chars().count() <= room {
        return format!("{base} {clean}");
    }
    let kept: String = clean.chars().take(room.saturating_sub(3)).collect();
    format!("{base} {kept}...")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub price: String,
    #[serde(rename = "priceCurrency")]
    pub price_currency: &'static str,
    pub availability: &'static str,
    pub url: String,
}

/// schema.org `Product` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductJsonLd {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub image: String,
    pub offers: Offer,
}

pub fn product_json_ld(detail: &ProductDetail, url: &str) -> ProductJsonLd {
    let product = &detail.product;
    ProductJsonLd {
        context: "https://schema.org",
        kind: "Product",
        name: product.name.clone(),
        description: product
            .detail
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("{} - Producto de calidad", product.name)),
        sku: product.sku.clone(),
        image: product
            .image_path
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        offers: Offer {
            kind: "Offer",
            price: decimal_amount(product.price),
            price_currency: "EUR",
            availability: if detail.has_stock() {
                "https://schema.org/InStock"
            } else {
                "https://schema.org/OutOfStock"
            },
            url: url.to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    /// `None` for the current page.
    pub href: Option<String>,
}

impl Breadcrumb {
    fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self { label: label.into(), href: Some(href.into()) }
    }
}

/// Home, then family, category and subcategory listings, then the product.
pub fn product_breadcrumbs(product_name: &str, chain: Option<&TaxonomyChain>) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb::link("Inicio", "/")];
    if let Some(chain) = chain {
        if let Some(category) = &chain.category {
            if let Some(family) = &chain.family {
                crumbs.push(Breadcrumb::link(&family.name, format!("/?familia={}", family.id)));
            }
            crumbs.push(Breadcrumb::link(&category.name, format!("/?categoria={}", category.id)));
        }
        let sub = &chain.subcategory;
        crumbs.push(Breadcrumb::link(&sub.name, format!("/?subcategoria={}", sub.id)));
    }
    crumbs.push(Breadcrumb { label: product_name.to_string(), href: None });
    crumbs
}

/// Metadata for one storefront page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub image_url: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub json_ld: Option<ProductJsonLd>,
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn listing_meta(base_url: &str, path: &TaxonomyPath, product_count: Option<usize>) -> PageMeta {
    PageMeta {
        title: listing_title(path),
        description: listing_description(path, product_count),
        canonical_url: join_url(base_url, "/"),
        image_url: None,
        breadcrumbs: Vec::new(),
        json_ld: None,
    }
}

pub fn product_meta(base_url: &str, detail: &ProductDetail) -> PageMeta {
    let product = &detail.product;
    let slug = generate_product_slug(&product.name, product.id);
    let image_url = match product.image_path.as_deref() {
        Some(path) if path.starts_with("http://") || path.starts_with("https://") => path.to_string(),
        Some(path) => join_url(base_url, path),
        None => join_url(base_url, PLACEHOLDER_IMAGE),
    };
    PageMeta {
        title: product_title(&product.name, product.price),
        description: product_description(&product.name, product.detail.as_deref(), product.price),
        canonical_url: join_url(base_url, &slug),
        image_url: Some(image_url),
        breadcrumbs: product_breadcrumbs(&product.name, detail.taxonomy.as_ref()),
        json_ld: Some(product_json_ld(detail, &format!("/{slug}"))),
    }
}

pub fn product_not_found_meta(base_url: &str) -> PageMeta {
    PageMeta {
        title: "Producto no encontrado".to_string(),
        description: "El producto que buscas no está disponible".to_string(),
        canonical_url: join_url(base_url, "/"),
        image_url: None,
        breadcrumbs: Vec::new(),
        json_ld: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Home page first, then one entry per product.
pub fn sitemap<'a>(
    base_url: &str,
    products: impl IntoIterator<Item = (&'a str, vitrina_core::ProductId)>,
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let home = SitemapEntry {
        url: base_url.trim_end_matches('/').to_string(),
        last_modified: now,
        change_frequency: ChangeFrequency::Daily,
        priority: 1.0,
    };
    std::iter::once(home)
        .chain(products.into_iter().map(|(name, id)| SitemapEntry {
            url: join_url(base_url, &generate_product_slug(name, id)),
            last_modified: now,
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.8,
        }))
        .collect()
}
