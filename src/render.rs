//! Plain-text views of the catalog pages.

use std::fmt;

use crate::models::{Ingredient, RecentEntry, Recipe, Review};
use crate::normalizer::step_placeholder;

pub fn star_bar(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn render_card(recipe: &Recipe) -> String {
    format!(
        "[{}] {} · {} · 리뷰 {}개 · ★ {}",
        recipe.id, recipe.title, recipe.category, recipe.review_count, recipe.rating
    )
}

pub fn render_review(review: &Review) -> String {
    let stars = usize::from(review.rating.min(5));
    format!(
        "{} {}{}  {}\n  {}",
        review.user,
        "★".repeat(stars),
        "☆".repeat(5 - stars),
        review.date,
        review.text
    )
}

pub fn render_recent(entry: &RecentEntry) -> String {
    format!("{} ({}) → {}", entry.title, entry.info, entry.link)
}

/// Detail page for one recipe, written section by section.
pub struct DetailView<'a>(pub &'a Recipe);

impl fmt::Display for DetailView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recipe = self.0;
        writeln!(f, "{}", recipe.title)?;
        if !recipe.summary.is_empty() {
            writeln!(f, "{}", recipe.summary)?;
        }
        writeln!(f, "{} | {} | {}", recipe.category, recipe.difficulty, recipe.time)?;
        writeln!(
            f,
            "{} ({}점 / {}개 리뷰)",
            star_bar(recipe.rating),
            recipe.rating,
            recipe.review_count
        )?;
        writeln!(f, "이미지: {}", recipe.display_image())?;

        write_ingredients(f, "필수 재료", &recipe.ingredients_required, "등록된 필수 재료가 없습니다.")?;
        write_ingredients(f, "선택 재료", &recipe.ingredients_optional, "선택 재료 없음")?;

        writeln!(f, "\n조리 과정")?;
        if recipe.steps.is_empty() {
            writeln!(f, "  등록된 조리 과정이 없습니다.")?;
        }
        for (idx, step) in recipe.steps.iter().enumerate() {
            let title = if step.title.is_empty() {
                step_placeholder(idx)
            } else {
                step.title.clone()
            };
            writeln!(f, "  {}. {}", idx + 1, title)?;
            if !step.desc.is_empty() {
                writeln!(f, "     {}", step.desc.replace('\n', "\n     "))?;
            }
        }

        writeln!(f, "\n리뷰 ({}개)", recipe.reviews.len())?;
        if recipe.reviews.is_empty() {
            writeln!(f, "  아직 등록된 리뷰가 없습니다.")?;
        }
        for review in &recipe.reviews {
            writeln!(f, "  {}", render_review(review).replace('\n', "\n  "))?;
        }
        Ok(())
    }
}

fn write_ingredients(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    items: &[Ingredient],
    empty: &str,
) -> fmt::Result {
    writeln!(f, "\n{}", heading)?;
    if items.is_empty() {
        writeln!(f, "  {}", empty)?;
    }
    for item in items {
        writeln!(f, "  - {} {}", item.name, item.amount)?;
    }
    Ok(())
}

pub fn render_detail(recipe: &Recipe) -> String {
    DetailView(recipe).to_string()
}
