//! The nearby directory and its text/category filter.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  geo::{Coordinate, Distance},
  person::{Category, Person, PersonId, Rating, TravelMode},
};

// ─── Category filter ─────────────────────────────────────────────────────────

/// Category restriction applied by [`filter`]. `All` matches every entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
  #[default]
  All,
  #[serde(untagged)]
  Only(Category),
}

impl CategoryFilter {
  pub fn admits(&self, category: Category) -> bool {
    match self {
      Self::All => true,
      Self::Only(c) => *c == category,
    }
  }

  /// Cycle `all → business → friendly → all`.
  pub fn next(self) -> Self {
    match self {
      Self::All => Self::Only(Category::Business),
      Self::Only(Category::Business) => Self::Only(Category::Friendly),
      Self::Only(Category::Friendly) => Self::All,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Only(c) => c.into(),
    }
  }
}

impl FromStr for CategoryFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.eq_ignore_ascii_case("all") {
      return Ok(Self::All);
    }
    Category::from_str(s)
      .map(Self::Only)
      .map_err(|_| Error::UnknownCategory(s.to_string()))
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Entries whose name or bio contains `query` (case-insensitive) and whose
/// category is admitted by `category`. Input order is preserved.
pub fn filter<'a>(
  people: &'a [Person],
  query: &str,
  category: CategoryFilter,
) -> Vec<&'a Person> {
  let needle = query.trim().to_lowercase();
  people
    .iter()
    .filter(|p| category.admits(p.category) && p.matches_text(&needle))
    .collect()
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// A directory entry paired with values derived from the viewer's position.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<'a> {
  pub person:         &'a Person,
  /// `None` when the viewer's position is unknown.
  pub distance:       Option<Distance>,
  pub travel_minutes: Option<u32>,
}

/// The working set of candidate people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directory {
  people: Vec<Person>,
}

impl Directory {
  pub fn new(people: Vec<Person>) -> Self { Self { people } }

  pub fn people(&self) -> &[Person] { &self.people }

  pub fn len(&self) -> usize { self.people.len() }

  pub fn is_empty(&self) -> bool { self.people.is_empty() }

  pub fn get(&self, id: PersonId) -> Option<&Person> {
    self.people.iter().find(|p| p.id == id)
  }

  pub fn filter(&self, query: &str, category: CategoryFilter) -> Vec<&Person> {
    filter(&self.people, query, category)
  }

  /// Attach derived distance and travel time to each of `people`.
  pub fn nearby<'a>(
    people: impl IntoIterator<Item = &'a Person>,
    viewer: Option<Coordinate>,
    mode: TravelMode,
  ) -> Vec<Nearby<'a>> {
    people
      .into_iter()
      .map(|person| {
        let distance = viewer.map(|v| v.distance_to(&person.position));
        Nearby {
          person,
          distance,
          travel_minutes: distance.map(|d| mode.minutes_for(d.meters())),
        }
      })
      .collect()
  }
}

impl Default for Directory {
  /// The three-person directory around central Paris.
  fn default() -> Self {
    let fixture = |id, name: &str, avatar: &str, category, bio: &str, lat, lng, rating, meetups, place: &str| {
      Person {
        id: PersonId(id),
        name: name.to_string(),
        avatar: avatar.to_string(),
        category,
        bio: bio.to_string(),
        position: Coordinate { lat, lng },
        rating: Rating(rating),
        meetups,
        favorite_place: Some(place.to_string()),
      }
    };
    Self::new(vec![
      fixture(
        1,
        "Emma",
        "👩‍💼",
        Category::Business,
        "Marketing consultant who runs on coffee",
        48.8576,
        2.3532,
        4.8,
        12,
        "Café Le Central",
      ),
      fixture(
        2,
        "Lucas",
        "👨‍🎨",
        Category::Friendly,
        "Graphic designer, creative and open-minded",
        48.8586,
        2.3542,
        4.9,
        8,
        "Café Commerce",
      ),
      fixture(
        3,
        "Sophie",
        "👩‍💻",
        Category::Business,
        "Full-stack developer into tech and good espresso",
        48.8596,
        2.3552,
        4.7,
        15,
        "Café Culture",
      ),
    ])
  }
}
