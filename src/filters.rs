//! Place predicates and their conjunction.

use serde::{Deserialize, Serialize};

use crate::model::{Dataset, Place, PlaceId};

/// One filter over places. An inactive filter matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    /// Place belongs to the category.
    Category(Option<&'a str>),
    /// Place is in the district.
    District(Option<&'a str>),
    /// Place is certified.
    Certified(bool),
}

impl Predicate<'_> {
    pub fn matches(&self, place: &Place) -> bool {
        match *self {
            Predicate::Category(None) | Predicate::District(None) | Predicate::Certified(false) => {
                true
            }
            Predicate::Category(Some(id)) => place.has_category(id),
            Predicate::District(Some(id)) => place.district == id,
            Predicate::Certified(true) => place.certified,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            Predicate::Category(None) | Predicate::District(None) | Predicate::Certified(false)
        )
    }
}

/// Snapshot of the three filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub category: Option<String>,
    pub district: Option<String>,
    pub certified_only: bool,
}

impl FilterSelection {
    pub fn predicates(&self) -> [Predicate<'_>; 3] {
        [
            Predicate::Category(self.category.as_deref()),
            Predicate::District(self.district.as_deref()),
            Predicate::Certified(self.certified_only),
        ]
    }

    /// A place is visible when every predicate matches.
    pub fn matches(&self, place: &Place) -> bool {
        self.predicates().iter().all(|p| p.matches(place))
    }

    pub fn active_count(&self) -> usize {
        self.predicates().iter().filter(|p| p.is_active()).count()
    }

    /// Ids of the matching places, in dataset order.
    pub fn apply(&self, dataset: &Dataset) -> Vec<PlaceId> {
        dataset
            .places
            .iter()
            .enumerate()
            .filter(|(_, place)| self.matches(place))
            .map(|(i, _)| PlaceId(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, District, Position};

    fn place(name: &str, categories: &[&str], district: &str, certified: bool) -> Place {
        Place {
            name: name.to_string(),
            position: Position::new(40.0, -8.0),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            district: district.to_string(),
            certified,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            places: vec![
                place("Alpha", &["food"], "A", true),
                place("Bravo", &["shop"], "B", false),
                place("Charlie", &["food", "shop"], "B", true),
                place("Delta", &[], "A", false),
            ],
            categories: vec![
                Category {
                    id: "food".to_string(),
                    name: Default::default(),
                },
                Category {
                    id: "shop".to_string(),
                    name: Default::default(),
                },
            ],
            districts: vec![
                District {
                    id: "A".to_string(),
                    name: "A".to_string(),
                },
                District {
                    id: "B".to_string(),
                    name: "B".to_string(),
                },
            ],
        }
    }

    fn all_selections() -> Vec<FilterSelection> {
        let categories = [None, Some("food"), Some("shop"), Some("none")];
        let districts = [None, Some("A"), Some("B")];
        let mut out = Vec::new();
        for category in categories {
            for district in districts {
                for certified_only in [false, true] {
                    out.push(FilterSelection {
                        category: category.map(str::to_string),
                        district: district.map(str::to_string),
                        certified_only,
                    });
                }
            }
        }
        out
    }

    #[test]
    fn test_no_selection_shows_everything() {
        let ds = dataset();
        let visible = FilterSelection::default().apply(&ds);
        assert_eq!(visible.len(), ds.places.len());
    }

    #[test]
    fn test_category_filter() {
        let ds = dataset();
        let selection = FilterSelection {
            category: Some("shop".to_string()),
            ..Default::default()
        };
        assert_eq!(selection.apply(&ds), vec![PlaceId(1), PlaceId(2)]);
    }

    #[test]
    fn test_district_and_certified() {
        let ds = dataset();
        let selection = FilterSelection {
            district: Some("A".to_string()),
            certified_only: true,
            ..Default::default()
        };
        assert_eq!(selection.apply(&ds), vec![PlaceId(0)]);
        assert_eq!(selection.active_count(), 2);
    }

    #[test]
    fn test_conjunction_matches_every_predicate() {
        let ds = dataset();
        for selection in all_selections() {
            let expected: Vec<PlaceId> = ds
                .places
                .iter()
                .enumerate()
                .filter(|(_, p)| {
                    selection.category.as_ref().is_none_or(|c| p.has_category(c))
                        && selection.district.as_ref().is_none_or(|d| &p.district == d)
                        && (!selection.certified_only || p.certified)
                })
                .map(|(i, _)| PlaceId(i))
                .collect();
            assert_eq!(selection.apply(&ds), expected, "{selection:?}");
        }
    }

    #[test]
    fn test_adding_a_constraint_never_widens() {
        let ds = dataset();
        for selection in all_selections() {
            let visible = selection.apply(&ds);
            let narrower = [
                FilterSelection {
                    certified_only: true,
                    ..selection.clone()
                },
                FilterSelection {
                    district: selection.district.clone().or(Some("B".to_string())),
                    ..selection.clone()
                },
                FilterSelection {
                    category: selection.category.clone().or(Some("food".to_string())),
                    ..selection.clone()
                },
            ];
            for tighter in narrower {
                let subset = tighter.apply(&ds);
                assert!(subset.iter().all(|id| visible.contains(id)), "{tighter:?}");
            }
        }
    }

    #[test]
    fn test_inactive_predicates() {
        let p = place("X", &[], "A", false);
        assert!(Predicate::Category(None).matches(&p));
        assert!(!Predicate::Category(Some("food")).matches(&p));
        assert!(Predicate::Certified(false).matches(&p));
        assert!(!Predicate::Certified(true).matches(&p));
        assert!(!Predicate::District(None).is_active());
    }
}
