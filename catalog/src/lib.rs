use model::{Category, Prefecture, Spot};

pub mod model;
pub mod routes;

use actix_web::web;

/// The curated spot catalog. Deserialized once from the embedded dataset at
/// process start and shared immutably; concurrent readers need no
/// synchronization.
pub struct SpotCatalog {
    spots: Vec<Spot>,
}

impl SpotCatalog {
    /// Loads the embedded dataset.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is malformed. The dataset ships inside the
    /// binary, so this can only fail at startup on a bad build.
    pub fn load() -> Self {
        let spots: Vec<Spot> = serde_json::from_str(include_str!("../data/spots.json"))
            .expect("embedded spot dataset must parse");
        SpotCatalog { spots }
    }

    pub fn all(&self) -> &[Spot] {
        &self.spots
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Spot> {
        self.spots.iter().find(|s| s.id == id)
    }

    /// Spots matching the given filters. `None` matches everything.
    pub fn filter(
        &self,
        prefecture: Option<Prefecture>,
        category: Option<Category>,
    ) -> Vec<&Spot> {
        self.spots
            .iter()
            .filter(|s| prefecture.is_none_or(|p| s.prefecture == p))
            .filter(|s| category.is_none_or(|c| s.categories.contains(&c)))
            .collect()
    }
}

pub fn mount_spots() -> actix_web::Scope {
    web::scope("/spots")
        .service(routes::get_spots)
        .service(routes::get_spot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn dataset_loads_and_ids_are_unique() {
        let catalog = SpotCatalog::load();
        assert!(!catalog.is_empty());

        let ids: HashSet<&str> = catalog.all().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn every_spot_has_a_category_and_covers_all_prefectures() {
        let catalog = SpotCatalog::load();
        for spot in catalog.all() {
            assert!(!spot.categories.is_empty(), "{} has no categories", spot.id);
            assert!(!spot.description.is_empty(), "{} has no description", spot.id);
        }
        for prefecture in Prefecture::ALL {
            assert!(
                !catalog.filter(Some(prefecture), None).is_empty(),
                "no spots for {prefecture}"
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog = SpotCatalog::load();
        let aso = catalog.get("aso-caldera").expect("aso-caldera is seeded");
        assert_eq!(aso.name, "Mount Aso Caldera");
        assert_eq!(aso.prefecture, Prefecture::Kumamoto);
        assert!(catalog.get("no-such-spot").is_none());
    }

    #[test]
    fn filters_combine() {
        let catalog = SpotCatalog::load();
        let oita_onsen = catalog.filter(Some(Prefecture::Oita), Some(Category::Onsen));
        assert!(!oita_onsen.is_empty());
        for spot in oita_onsen {
            assert_eq!(spot.prefecture, Prefecture::Oita);
            assert!(spot.categories.contains(&Category::Onsen));
        }
    }
}
