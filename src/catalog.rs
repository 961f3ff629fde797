use crate::recipe::{Recipe, RecipeCatalog};

/// Default burger recipe catalog, handed to the core as configuration data.
/// Swapping this out for a different catalog (or loading one from a file)
/// never touches the core.
pub fn default_catalog() -> RecipeCatalog {
    RecipeCatalog::new(vec![
        Recipe::new(
            "classic",
            &["bun_top", "patty", "ketchup", "bun_bottom"],
            550,
        ),
        Recipe::new(
            "cheeseburger",
            &["bun_top", "patty", "cheese", "ketchup", "bun_bottom"],
            650,
        ),
        Recipe::new(
            "bacon_deluxe",
            &[
                "bun_top",
                "patty",
                "cheese",
                "bacon",
                "lettuce",
                "tomato",
                "bun_bottom",
            ],
            850,
        ),
        Recipe::new(
            "veggie",
            &["bun_top", "lettuce", "tomato", "pickles", "bun_bottom"],
            500,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_fits_a_single_station() {
        let catalog = default_catalog();
        assert!(catalog.ingredient_names().len() <= crate::config::Limits::N_INGREDIENTS);
        assert!(!catalog.recipes().is_empty());
    }
}
