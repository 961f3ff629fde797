use crate::config::Limits;
use crate::fixed_str::FixedStr;

/// A named, ordered list of ingredient names used to build one order (§3).
#[derive(Clone, Copy, Debug)]
pub struct Recipe {
    pub name: FixedStr<32>,
    pub ingredients: [FixedStr<24>; Limits::MAX_RECIPE_LEN],
    pub ingredient_count: u8,
    pub price_cents: u32,
}

impl Recipe {
    pub fn new(name: &str, ingredients: &[&str], price_cents: u32) -> Self {
        assert!(
            ingredients.len() <= Limits::MAX_RECIPE_LEN,
            "recipe exceeds the 10-ingredient budget"
        );
        let mut slots = [FixedStr::EMPTY; Limits::MAX_RECIPE_LEN];
        for (i, ingredient) in ingredients.iter().enumerate() {
            slots[i] = FixedStr::new(ingredient);
        }
        Recipe {
            name: FixedStr::new(name),
            ingredients: slots,
            ingredient_count: ingredients.len() as u8,
            price_cents,
        }
    }

    pub fn ingredients(&self) -> &[FixedStr<24>] {
        &self.ingredients[..self.ingredient_count as usize]
    }
}

/// Configuration data supplied to the core at startup (out of scope as a
/// feature: the catalog itself is never mutated by the core) — a fixed,
/// named set of values the system is handed, not something the core
/// computes.
#[derive(Clone)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    ingredient_names: Vec<String>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        assert!(
            recipes.len() <= Limits::MAX_RECIPES,
            "catalog exceeds MAX_RECIPES"
        );
        let mut ingredient_names: Vec<String> = Vec::new();
        for recipe in &recipes {
            for ingredient in recipe.ingredients() {
                let name = ingredient.as_str().to_string();
                if !ingredient_names.contains(&name) {
                    ingredient_names.push(name);
                }
            }
        }
        assert!(
            ingredient_names.len() <= Limits::N_INGREDIENTS,
            "catalog uses more distinct ingredients than a station can dispense"
        );
        RecipeCatalog {
            recipes,
            ingredient_names,
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// The full distinct ingredient name list, in the stable order every
    /// station's dispenser array is laid out in.
    pub fn ingredient_names(&self) -> &[String] {
        &self.ingredient_names
    }

    pub fn ingredient_index(&self, name: &str) -> Option<usize> {
        self.ingredient_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_distinct_ingredients_across_recipes() {
        let catalog = RecipeCatalog::new(vec![
            Recipe::new("classic", &["bun_top", "patty", "bun_bottom"], 550),
            Recipe::new("cheese", &["bun_top", "patty", "cheese", "bun_bottom"], 650),
        ]);
        assert_eq!(catalog.ingredient_names().len(), 4);
        assert_eq!(catalog.ingredient_index("patty"), Some(1));
        assert_eq!(catalog.ingredient_index("nonexistent"), None);
    }
}
