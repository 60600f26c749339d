//! Price list endpoint.

use axum::Json;
use domain::catalog::{self, Catalog};
use domain::{CakeSize, Prompt};
use serde::Serialize;

#[derive(Serialize)]
pub struct PriceEntry {
    pub name: &'static str,
    pub price_minor: i64,
    pub price: String,
}

#[derive(Serialize)]
pub struct PriceListResponse {
    pub currency: &'static str,
    pub regular_flavors: Vec<PriceEntry>,
    pub bento_flavors: Vec<PriceEntry>,
    pub regular_decor: Vec<PriceEntry>,
    pub bento_decor: Vec<PriceEntry>,
    pub sizes_kg: Vec<u32>,
    pub cookie_price_minor: i64,
    pub cream_surcharge_minor: i64,
    /// The same listing as the `/prices` chat command shows.
    pub text: String,
}

fn entries(catalog: &Catalog) -> Vec<PriceEntry> {
    catalog
        .entries()
        .iter()
        .map(|&(name, price)| PriceEntry {
            name,
            price_minor: price.minor_units(),
            price: price.to_string(),
        })
        .collect()
}

/// GET /prices: Every catalog with its prices.
pub async fn list() -> Json<PriceListResponse> {
    Json(PriceListResponse {
        currency: catalog::CURRENCY,
        regular_flavors: entries(&catalog::REGULAR_FLAVORS),
        bento_flavors: entries(&catalog::BENTO_FLAVORS),
        regular_decor: entries(&catalog::REGULAR_DECOR),
        bento_decor: entries(&catalog::BENTO_DECOR),
        sizes_kg: CakeSize::all().map(|size| size.kg()).collect(),
        cookie_price_minor: catalog::COOKIE_PRICE.minor_units(),
        cream_surcharge_minor: catalog::CREAM_SURCHARGE.minor_units(),
        text: Prompt::price_list().text,
    })
}
