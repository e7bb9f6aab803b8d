//! Page parameters: category slugs, recipe ids carried in links, detail links.

use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Korean,
    Western,
    Chinese,
    Dessert,
    Drink,
}

/// Shown alongside desserts on the dessert page.
pub const SNACK_LABEL: &str = "간식";

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Korean,
        Category::Western,
        Category::Chinese,
        Category::Dessert,
        Category::Drink,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Korean => "korean",
            Category::Western => "western",
            Category::Chinese => "chinese",
            Category::Dessert => "dessert",
            Category::Drink => "drink",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Korean => "한식",
            Category::Western => "양식",
            Category::Chinese => "중식",
            Category::Dessert => "디저트",
            Category::Drink => "음료",
        }
    }

    /// Exact label match, except that the dessert page also takes snacks.
    pub fn matches(self, label: &str) -> bool {
        label == self.label() || (self == Category::Dessert && label == SNACK_LABEL)
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == wanted)
            .ok_or_else(|| CatalogError::UnknownCategory(wanted.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters a page can receive in its query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub category: Option<String>,
    pub recipe: Option<String>,
    pub id: Option<String>,
    pub sort: Option<String>,
    pub edit_id: Option<String>,
}

impl PageParams {
    /// Parses `a=1&b=2`, a `?a=1` suffix, or a full link such as
    /// `recipe.html?id=kimchi_fried_rice`. Unknown keys are ignored and the
    /// first occurrence of a key wins.
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, q)) => q,
            None => input,
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut params = PageParams::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(value);
            let slot = match decode_component(key).as_str() {
                "category" => &mut params.category,
                "recipe" => &mut params.recipe,
                "id" => &mut params.id,
                "sort" => &mut params.sort,
                "editId" => &mut params.edit_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    /// The recipe to show. `recipe` takes precedence over `id`; empty
    /// values count as absent.
    pub fn recipe_id(&self) -> Option<&str> {
        self.recipe
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.id.as_deref().filter(|v| !v.is_empty()))
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Resolves a bare id or anything carrying `recipe=`/`id=` to a recipe id.
pub fn recipe_id_from_target(target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    if !target.contains('=') {
        return Some(target.to_string());
    }
    PageParams::parse(target).recipe_id().map(str::to_string)
}

pub fn detail_link(detail_page: &str, recipe_id: &str) -> String {
    format!("{}?id={}", detail_page, urlencoding::encode(recipe_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_slugs_round_trip_to_labels() {
        let korean: Category = "korean".parse().unwrap();
        assert_eq!(korean.label(), "한식");
        assert!(matches!(
            "japanese".parse::<Category>(),
            Err(CatalogError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_dessert_matches_snacks() {
        assert!(Category::Dessert.matches("디저트"));
        assert!(Category::Dessert.matches("간식"));
        assert!(!Category::Korean.matches("간식"));
        assert!(!Category::Dessert.matches("한식"));
    }

    #[test]
    fn test_recipe_param_takes_precedence_over_id() {
        let params = PageParams::parse("recipe.html?id=second&recipe=first");
        assert_eq!(params.recipe_id(), Some("first"));

        let only_id = PageParams::parse("?id=kimchi_fried_rice");
        assert_eq!(only_id.recipe_id(), Some("kimchi_fried_rice"));

        let empty_recipe = PageParams::parse("recipe=&id=fallback");
        assert_eq!(empty_recipe.recipe_id(), Some("fallback"));
    }

    #[test]
    fn test_values_are_percent_decoded() {
        let params = PageParams::parse("category=dessert&sort=rating&editId=1764000000000&id=%EA%B9%80%EC%B9%98+%EC%B0%8C%EA%B0%9C");
        assert_eq!(params.category.as_deref(), Some("dessert"));
        assert_eq!(params.sort.as_deref(), Some("rating"));
        assert_eq!(params.edit_id.as_deref(), Some("1764000000000"));
        assert_eq!(params.recipe_id(), Some("김치 찌개"));
    }

    #[test]
    fn test_detail_link_encodes_id() {
        assert_eq!(detail_link("recipe.html", "kimchi_fried_rice"), "recipe.html?id=kimchi_fried_rice");
        assert_eq!(detail_link("recipe.html", "a b&c"), "recipe.html?id=a%20b%26c");
    }

    #[test]
    fn test_target_accepts_bare_ids_and_links() {
        assert_eq!(recipe_id_from_target("1764000000000").as_deref(), Some("1764000000000"));
        assert_eq!(
            recipe_id_from_target("recipe.html?id=a%20b").as_deref(),
            Some("a b")
        );
        assert_eq!(recipe_id_from_target("recipe.html?sort=rating"), None);
        assert_eq!(recipe_id_from_target("  "), None);
    }
}
