//! Recipe domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CookbookError, Result};
use crate::store::{quote_literal, PageRequest};

/// Recipe record as stored in the Delta `recipes` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub preparation: String,
    pub ingredients: String,
    pub image: Option<String>,
    /// Identity that created the recipe; advisory, not enforced
    pub owner_id: String,
    /// Derived from the title at creation, never recomputed
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecipeDraft {
    pub title: String,
    pub preparation: String,
    pub ingredients: String,
    pub image: Option<String>,
}

impl RecipeDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.preparation.trim().is_empty() {
            return Err(CookbookError::Validation(
                "Please provide title and preparation".into(),
            ));
        }
        Ok(())
    }
}

/// Body of an update request; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub preparation: Option<String>,
    pub ingredients: Option<String>,
    pub image: Option<String>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.preparation.is_none()
            && self.ingredients.is_none()
            && self.image.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.title) || blank(&self.preparation) {
            return Err(CookbookError::Validation(
                "Title and preparation cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Listing filters; every present field narrows the result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    pub owner_id: Option<String>,
    pub ingredient: Option<String>,
    pub slug: Option<String>,
    pub recipe_id: Option<String>,
    pub search_term: Option<String>,
}

impl RecipeFilter {
    /// Render as a SQL `WHERE` fragment (`true` when unfiltered)
    pub fn to_predicate(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(owner) = &self.owner_id {
            clauses.push(format!("owner_id = {}", quote_literal(owner)));
        }
        if let Some(ingredient) = &self.ingredient {
            clauses.push(format!("ingredients = {}", quote_literal(ingredient)));
        }
        if let Some(slug) = &self.slug {
            clauses.push(format!("slug = {}", quote_literal(slug)));
        }
        if let Some(id) = &self.recipe_id {
            clauses.push(format!("id = {}", quote_literal(id)));
        }
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
            let pattern = quote_literal(&format!("%{}%", escape_like(term)));
            clauses.push(format!(
                "(title ILIKE {pattern} ESCAPE '\\' OR preparation ILIKE {pattern} ESCAPE '\\')"
            ));
        }

        if clauses.is_empty() {
            "true".to_string()
        } else {
            clauses.join(" AND ")
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub page: PageRequest,
}

/// One page of recipes plus catalog counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListing {
    pub recipes: Vec<Recipe>,
    pub total: usize,
    pub last_month: usize,
}

/// Search terms match literally: LIKE wildcards and the escape character are escaped
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// URL slug: lowercase, whitespace becomes `-`, anything not `[a-z0-9-]` is dropped
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Grandma's Apple Pie!"), "grandmas-apple-pie");
        assert_eq!(slugify("Pad Thai"), "pad-thai");
        assert_eq!(slugify("Crème Brûlée"), "crme-brle");
        assert_eq!(slugify("Two  Spaces"), "two--spaces");
        assert_eq!(slugify("already-a-slug-42"), "already-a-slug-42");
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = RecipeDraft {
            title: "Shakshuka".into(),
            preparation: "Simmer tomatoes, crack eggs".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        draft.preparation = "   ".into();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_patch_validation() {
        assert!(RecipePatch::default().is_empty());
        let patch = RecipePatch {
            title: Some("".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        let patch = RecipePatch {
            image: Some("https://img.example/pie.jpg".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_filter_predicate() {
        assert_eq!(RecipeFilter::default().to_predicate(), "true");

        let filter = RecipeFilter {
            owner_id: Some("owner-1".into()),
            search_term: Some("o'clock".into()),
            ..Default::default()
        };
        assert_eq!(
            filter.to_predicate(),
            "owner_id = 'owner-1' AND (title ILIKE '%o''clock%' ESCAPE '\\' OR preparation ILIKE '%o''clock%' ESCAPE '\\')"
        );
    }

    #[test]
    fn test_search_term_wildcards_are_literal() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");

        let filter = RecipeFilter {
            search_term: Some("50%".into()),
            ..Default::default()
        };
        assert!(filter.to_predicate().contains("'%50\\%%'"));
    }
}
