//! Menu categories and navigable sections.

use serde::{Deserialize, Serialize};

/// A menu category served by the catalog backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Soups,
    Drinks,
    Desserts,
    MainCourses,
}

impl Category {
    /// All categories, in menu order.
    pub const ALL: [Self; 4] = [Self::Soups, Self::Drinks, Self::Desserts, Self::MainCourses];

    /// Path segment requested from the catalog backend.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Soups => "soups",
            Self::Drinks => "drinks",
            Self::Desserts => "desserts",
            Self::MainCourses => "mainCourses",
        }
    }

    /// Identifier of the section displaying this category.
    #[must_use]
    pub const fn section_id(self) -> &'static str {
        match self {
            Self::Soups => "soups",
            Self::Drinks => "drinks",
            Self::Desserts => "desserts",
            Self::MainCourses => "main-courses",
        }
    }

    /// Human-readable heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Soups => "Soups",
            Self::Drinks => "Drinks",
            Self::Desserts => "Desserts",
            Self::MainCourses => "Main courses",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Accepts the backend path, the section id, or a snake/lower-case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soups" => Ok(Self::Soups),
            "drinks" => Ok(Self::Drinks),
            "desserts" => Ok(Self::Desserts),
            "maincourses" | "main-courses" | "main_courses" => Ok(Self::MainCourses),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// A navigable section of the client: one menu category or the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Menu(Category),
    Cart,
}

impl Section {
    /// Resolve a navigation anchor such as `#soups` or `cart`.
    #[must_use]
    pub fn from_anchor(anchor: &str) -> Option<Self> {
        let id = anchor.trim().trim_start_matches('#');
        if id == "cart" {
            return Some(Self::Cart);
        }
        id.parse().ok().map(Self::Menu)
    }

    /// Identifier of the section.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Menu(category) => category.section_id(),
            Self::Cart => "cart",
        }
    }

    /// Whether this is the cart view.
    #[must_use]
    pub const fn is_cart(self) -> bool {
        matches!(self, Self::Cart)
    }
}
