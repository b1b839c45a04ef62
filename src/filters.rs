use std::cmp::Ordering;

use serde::Deserialize;

use crate::models::{Event, EventCategory, Place, SubmissionStatus};

/// Raw query string for `GET /places`. List values are comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceQuery {
    pub q: Option<String>,
    pub zone: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub search: Option<String>,
    pub zones: Vec<String>,
    pub categories: Vec<String>,
    pub price_ranges: Vec<String>,
    pub min_rating: Option<f64>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<PlaceQuery> for PlaceFilter {
    fn from(query: PlaceQuery) -> Self {
        Self {
            search: query
                .q
                .map(|q| q.trim().to_lowercase())
                .filter(|q| !q.is_empty()),
            zones: split_list(query.zone.as_deref()),
            categories: split_list(query.category.as_deref()),
            price_ranges: split_list(query.price_range.as_deref()),
            min_rating: query.min_rating,
        }
    }
}

impl PlaceFilter {
    /// Public visibility plus every requested criterion.
    pub fn matches(&self, place: &Place) -> bool {
        if place.status != SubmissionStatus::Approved {
            return false;
        }

        if let Some(search) = &self.search {
            let hit = [&place.name, &place.description, &place.zone]
                .iter()
                .any(|field| field.to_lowercase().contains(search.as_str()));
            if !hit {
                return false;
            }
        }

        if !self.zones.is_empty() && !self.zones.contains(&place.zone) {
            return false;
        }

        if !self.categories.is_empty()
            && !self
                .categories
                .iter()
                .any(|c| c == place.category.as_str())
        {
            return false;
        }

        if !self.price_ranges.is_empty() {
            match place.price_range {
                Some(range) if self.price_ranges.iter().any(|p| p == range.as_str()) => {}
                _ => return false,
            }
        }

        match self.min_rating {
            Some(min) => place.rating >= min,
            None => true,
        }
    }
}

/// Best rated first, then alphabetical.
pub fn sort_places(places: &mut [Place]) {
    places.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EventFilter {
    pub zone: Option<String>,
    pub category: Option<EventCategory>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        event.status == SubmissionStatus::Approved
            && self.zone.as_ref().map_or(true, |zone| &event.zone == zone)
            && self.category.map_or(true, |category| event.category == category)
    }
}

/// Chronological order by start date and time.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.start_time.cmp(&b.start_time))
    });
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub const DEFAULT_PAGE_SIZE: i64 = 20;
    pub const MAX_PAGE_SIZE: i64 = 100;

    /// Highest page whose offset still fits in an `i64`.
    pub const MAX_PAGE: i64 = i64::MAX / Self::MAX_PAGE_SIZE;

    /// `(page, page_size, offset)` with page in 1..=MAX_PAGE and size in 1..=100.
    pub fn resolve(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, Self::MAX_PAGE);
        let page_size = self
            .page_size
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE);
        (page, page_size, (page - 1) * page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::PriceRange;

    fn approved_places() -> Vec<Place> {
        fixtures::places()
            .into_iter()
            .filter(|p| p.status == SubmissionStatus::Approved)
            .collect()
    }

    #[test]
    fn query_lists_are_split_and_trimmed() {
        let filter = PlaceFilter::from(PlaceQuery {
            q: Some("  Serrana ".into()),
            zone: Some("Minas, Villa Serrana,".into()),
            category: None,
            price_range: Some("$$".into()),
            min_rating: Some(4.0),
        });
        assert_eq!(filter.search.as_deref(), Some("serrana"));
        assert_eq!(filter.zones, vec!["Minas", "Villa Serrana"]);
        assert!(filter.categories.is_empty());
        assert_eq!(filter.price_ranges, vec!["$$"]);
    }

    #[test]
    fn pending_places_are_never_listed() {
        let pending = fixtures::places()
            .into_iter()
            .find(|p| p.status == SubmissionStatus::Pending)
            .unwrap();
        assert!(!PlaceFilter::default().matches(&pending));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let filter = PlaceFilter {
            search: Some("parrilla".into()),
            ..Default::default()
        };
        let hits: Vec<_> = approved_places()
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.name.to_lowercase().contains("parrilla")
            || p.description.to_lowercase().contains("parrilla")));
    }

    #[test]
    fn price_filter_excludes_places_without_price() {
        let mut place = approved_places().remove(0);
        place.price_range = None;
        let filter = PlaceFilter {
            price_ranges: vec!["$".into()],
            ..Default::default()
        };
        assert!(!filter.matches(&place));

        place.price_range = Some(PriceRange::Low);
        assert!(filter.matches(&place));
    }

    #[test]
    fn rating_threshold_is_inclusive() {
        let mut place = approved_places().remove(0);
        place.rating = 4.5;
        let filter = PlaceFilter {
            min_rating: Some(4.5),
            ..Default::default()
        };
        assert!(filter.matches(&place));
        place.rating = 4.4;
        assert!(!filter.matches(&place));
    }

    #[test]
    fn places_sort_by_rating_then_name() {
        let mut places = approved_places();
        sort_places(&mut places);
        for pair in places.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
        }
    }

    #[test]
    fn events_sort_chronologically() {
        let mut events = fixtures::events();
        events.reverse();
        sort_events(&mut events);
        for pair in events.windows(2) {
            assert!(pair[0].start_date <= pair[1].start_date);
        }
    }

    #[test]
    fn paging_is_clamped() {
        let query = PageQuery {
            page: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(query.resolve(), (1, 100, 0));

        let query = PageQuery {
            page: Some(3),
            page_size: None,
        };
        assert_eq!(query.resolve(), (3, 20, 40));

        let query = PageQuery {
            page: Some(i64::MAX),
            page_size: Some(100),
        };
        let (page, page_size, offset) = query.resolve();
        assert_eq!(page, PageQuery::MAX_PAGE);
        assert_eq!(page_size, 100);
        assert!(offset >= 0);
        assert_eq!(offset, (PageQuery::MAX_PAGE - 1) * 100);
    }
}
