/// Filter/sort engine
///
/// Derives the view list (the artworks currently eligible for display)
/// from the catalog and the selected category and period.

use super::catalog::Catalog;
use super::data::{Artwork, Category};

/// Select the artworks of `category` whose year is exactly `period`,
/// newest first. Undated artworks sort last; ties keep catalog order.
pub fn view_list(catalog: &Catalog, category: &Category, period: &str) -> Vec<Artwork> {
    let mut items: Vec<Artwork> = catalog
        .items(category)
        .iter()
        .filter(|item| item.year == period)
        .cloned()
        .collect();

    // sort_by is stable
    items.sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));
    items
}

/// The explicitly owned view state: selection plus the derived view list
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    category: Category,
    period: String,
    items: Vec<Artwork>,
}

impl ViewState {
    pub fn new(catalog: &Catalog, category: Category, period: impl Into<String>) -> Self {
        let period = period.into();
        let items = view_list(catalog, &category, &period);
        Self {
            category,
            period,
            items,
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    /// The current view list
    pub fn items(&self) -> &[Artwork] {
        &self.items
    }

    pub fn select_category(&mut self, catalog: &Catalog, category: Category) {
        self.category = category;
        self.refresh(catalog);
    }

    pub fn select_period(&mut self, catalog: &Catalog, period: impl Into<String>) {
        self.period = period.into();
        self.refresh(catalog);
    }

    /// Full recompute, no caching across changes
    pub fn refresh(&mut self, catalog: &Catalog) {
        self.items = view_list(catalog, &self.category, &self.period);
        tracing::debug!(
            category = %self.category,
            period = %self.period,
            visible = self.items.len(),
            "view list recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{
                "illustrations": [
                    {"title": "January", "description": "", "year": "2024", "date": "2024-01-01", "mainImage": "jan.jpg"},
                    {"title": "Undated", "description": "", "year": "2024", "mainImage": "undated.jpg"},
                    {"title": "June", "description": "", "year": "2024", "date": "2024-06-01", "mainImage": "jun.jpg"},
                    {"title": "Other year", "description": "", "year": "2023", "date": "2023-06-01", "mainImage": "old.jpg"},
                    {"title": "Also undated", "description": "", "year": "2024", "mainImage": "undated2.jpg"}
                ],
                "animation": []
            }"#,
        )
        .unwrap()
    }

    fn titles(items: &[Artwork]) -> Vec<&str> {
        items.iter().map(|item| item.title.as_str()).collect()
    }

    #[test]
    fn test_sorted_newest_first_undated_last() {
        let items = view_list(&catalog(), &Category::new("illustrations"), "2024");
        assert_eq!(
            titles(&items),
            vec!["June", "January", "Undated", "Also undated"]
        );
    }

    #[test]
    fn test_exact_year_match() {
        let items = view_list(&catalog(), &Category::new("illustrations"), "2023");
        assert_eq!(titles(&items), vec!["Other year"]);

        assert!(view_list(&catalog(), &Category::new("illustrations"), "202").is_empty());
    }

    #[test]
    fn test_filter_is_repeatable() {
        let catalog = catalog();
        let first = view_list(&catalog, &Category::new("illustrations"), "2024");
        let second = view_list(&catalog, &Category::new("illustrations"), "2024");
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_or_empty_category_yields_nothing() {
        let catalog = catalog();
        assert!(view_list(&catalog, &Category::new("animation"), "2024").is_empty());
        assert!(view_list(&catalog, &Category::new("manga"), "2024").is_empty());
    }

    #[test]
    fn test_view_state_recomputes_on_change() {
        let catalog = catalog();
        let mut state = ViewState::new(&catalog, Category::new("illustrations"), "2024");
        assert_eq!(state.items().len(), 4);

        state.select_period(&catalog, "2023");
        assert_eq!(state.period(), "2023");
        assert_eq!(titles(state.items()), vec!["Other year"]);

        state.select_category(&catalog, Category::new("animation"));
        assert!(state.items().is_empty());
    }
}
