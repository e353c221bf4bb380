//! Catalog page extraction
//!
//! This module turns a parsed page of each hierarchy level into the
//! descriptors of the next level:
//! - root page → cities (`#citylist`)
//! - city page → districts (`div.Districtlist ul`)
//! - district page → textbook records (`div.i_d` grade groups)
//!
//! Structural drift on the source site degrades to empty results rather
//! than errors.

use crate::model::{CityDescriptor, DistrictDescriptor, TextbookRecord};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Navigation labels on city pages that are never districts
const EXCLUDED_DISTRICT_LABELS: [&str; 5] = ["小学", "初中", "高中", "所有", "更多"];

/// A district link must contain one of these administrative-unit markers
const DISTRICT_MARKERS: [char; 4] = ['区', '县', '市', '旗'];

/// Version shown when a textbook entry carries no edition tag
pub const UNKNOWN_VERSION: &str = "未知版本";

/// Why a single entry of a district page was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("grade group #{index} has no title")]
    MissingGradeTitle { index: usize },

    #[error("entry #{index} of grade {grade} has no title link")]
    MissingTitleLink { grade: String, index: usize },
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text content of an element with whitespace runs collapsed
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the city list from the root catalog page
///
/// The `#citylist` container holds a flat run of `<b>` province labels each
/// followed by the `<a>` links of its cities. The most recent label is
/// carried forward as the province of every following city.
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use textbook_harvest::crawler::extract_cities;
///
/// let html = r#"<div id="citylist"><b>北京</b><a href="/bj/">北京市</a></div>"#;
/// let cities = extract_cities(&Html::parse_document(html), "http://www.dzkbw.com");
/// assert_eq!(cities[0].province, "北京");
/// assert_eq!(cities[0].url, "http://www.dzkbw.com/bj/");
/// ```
pub fn extract_cities(document: &Html, base_url: &str) -> Vec<CityDescriptor> {
    let mut cities = Vec::new();

    let Some(container_selector) = selector("#citylist") else {
        return cities;
    };
    let Some(container) = document.select(&container_selector).next() else {
        tracing::error!("City list container #citylist not found on root page");
        return cities;
    };

    let mut current_province = String::new();

    for child in container.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "b" => current_province = element_text(&child),
            "a" => {
                let Some(href) = child.value().attr("href") else {
                    tracing::debug!("Skipping city link without href under {}", current_province);
                    continue;
                };
                cities.push(CityDescriptor {
                    province: current_province.clone(),
                    name: element_text(&child),
                    url: format!("{}{}", base_url, href),
                });
            }
            _ => {}
        }
    }

    cities
}

/// Extracts the district links from a city page
///
/// Only links whose text names an administrative unit are kept; school-level
/// navigation entries are dropped.
pub fn extract_districts(document: &Html, base_url: &str) -> Vec<DistrictDescriptor> {
    let mut districts = Vec::new();

    let (Some(container_selector), Some(list_selector), Some(link_selector)) = (
        selector("div.Districtlist"),
        selector("ul"),
        selector("li a[href]"),
    ) else {
        return districts;
    };

    let Some(container) = document.select(&container_selector).next() else {
        tracing::warn!("District list container div.Districtlist not found");
        return districts;
    };

    let Some(list) = container.select(&list_selector).next() else {
        tracing::warn!("District list container has no ul element");
        return districts;
    };

    for link in list.select(&link_selector) {
        let text = element_text(&link);

        if EXCLUDED_DISTRICT_LABELS.contains(&text.as_str()) {
            continue;
        }

        if !text.contains(DISTRICT_MARKERS) {
            continue;
        }

        if let Some(href) = link.value().attr("href") {
            districts.push(DistrictDescriptor {
                name: text,
                url: format!("{}{}", base_url, href),
            });
        }
    }

    districts
}

/// Extracts every textbook entry from a district page
///
/// Each `div.i_d` grade group has an `h3` title and a `div.divlist` of `li`
/// entries. An entry yields a record when it has an `a.ih3` title link; the
/// `i` tag, when present, gives the edition. Entries that cannot be turned
/// into a record are returned as `Err` so the caller decides how to report
/// them; the remaining entries are still extracted.
///
/// Relative book links are resolved against the city page URL. A title link
/// without `href` resolves to the city URL itself.
pub fn extract_leaf_records(
    document: &Html,
    city: &CityDescriptor,
    district: &DistrictDescriptor,
) -> Vec<Result<TextbookRecord, SkipReason>> {
    let mut results = Vec::new();

    let (
        Some(group_selector),
        Some(title_selector),
        Some(list_selector),
        Some(item_selector),
        Some(version_selector),
        Some(link_selector),
    ) = (
        selector("div.i_d"),
        selector("h3"),
        selector("div.divlist"),
        selector("li"),
        selector("i"),
        selector("a.ih3"),
    )
    else {
        return results;
    };

    for (group_index, group) in document.select(&group_selector).enumerate() {
        let Some(title) = group.select(&title_selector).next() else {
            tracing::warn!("Grade title not found in group #{} of {}", group_index, district.name);
            results.push(Err(SkipReason::MissingGradeTitle { index: group_index }));
            continue;
        };
        let grade = element_text(&title);

        let Some(list) = group.select(&list_selector).next() else {
            continue;
        };

        for (item_index, item) in list.select(&item_selector).enumerate() {
            let version = item
                .select(&version_selector)
                .next()
                .map(|tag| element_text(&tag))
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

            let Some(link) = item.select(&link_selector).next() else {
                results.push(Err(SkipReason::MissingTitleLink {
                    grade: grade.clone(),
                    index: item_index,
                }));
                continue;
            };

            let subject = element_text(&link);
            // A link without href still names a textbook; it points at the city page
            let href = link.value().attr("href").unwrap_or_default();

            results.push(Ok(TextbookRecord {
                province: city.province.clone(),
                city: city.name.clone(),
                district: district.name.clone(),
                grade: grade.clone(),
                subject,
                version,
                book_url: resolve_book_url(href, &city.url),
            }));
        }
    }

    results
}

/// Keeps absolute links as they are and appends relative ones to the city URL
fn resolve_book_url(href: &str, city_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", city_url, href)
    }
}
