use crate::services::vocabulary::{
    contains_any, Vocabulary, TAG_DRINK, TAG_VEGAN, TAG_VEGETARIAN,
};
use std::collections::BTreeSet;

/// Lower-cased "name description" text that every substring rule runs against.
pub fn item_text(name: &str, description: &str) -> String {
    format!("{} {}", name, description).to_lowercase()
}

/// Stored tags plus tags inferred from ingredients mentioned in the item text.
///
/// Matching is plain substring containment, so "cheesecake" picks up
/// `vegetarian` through "cheese" and "eggplant" through "egg".
pub fn expand_tags(
    name: &str,
    description: &str,
    stored: &[String],
    vocab: &Vocabulary,
) -> BTreeSet<String> {
    let text = item_text(name, description);

    let mut tags: BTreeSet<String> = stored
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    for (ingredient, inferred) in &vocab.ingredient_tags {
        if text.contains(ingredient.as_str()) {
            tags.extend(inferred.iter().cloned());
        }
    }

    let stored_drink_tag = tags.iter().any(|tag| vocab.drinks.contains(tag));
    if stored_drink_tag || contains_any(&text, &vocab.drinks) {
        tags.insert(TAG_DRINK.to_string());
    }

    if tags.contains(TAG_VEGAN) {
        tags.insert(TAG_VEGETARIAN.to_string());
    }

    tags
}

/// Space-joined rendering used for free-keyword matching.
pub fn render_tags(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::vocabulary::TAG_SPICY;

    fn expand(name: &str, description: &str, stored: &[&str]) -> BTreeSet<String> {
        let stored: Vec<String> = stored.iter().map(|s| s.to_string()).collect();
        expand_tags(name, description, &stored, &Vocabulary::builtin())
    }

    #[test]
    fn test_stored_tags_are_lowercased() {
        let tags = expand("Plain Rice", "", &["Gluten-Free", " Side "]);
        assert!(tags.contains("gluten-free"));
        assert!(tags.contains("side"));
    }

    #[test]
    fn test_ingredient_inference() {
        let tags = expand("Spicy Paneer Tikka", "grilled paneer in chili sauce", &[]);
        assert!(tags.contains(TAG_VEGETARIAN));
        assert!(tags.contains(TAG_SPICY));
        assert!(!tags.contains(TAG_VEGAN));
        assert!(!tags.contains(TAG_DRINK));
    }

    #[test]
    fn test_vegan_implies_vegetarian() {
        let tags = expand("Garden Bowl", "", &["Vegan"]);
        assert!(tags.contains(TAG_VEGAN));
        assert!(tags.contains(TAG_VEGETARIAN));

        let tags = expand("Tofu Stir Fry", "with broccoli", &[]);
        assert!(tags.contains(TAG_VEGAN));
        assert!(tags.contains(TAG_VEGETARIAN));
    }

    #[test]
    fn test_drink_inference() {
        assert!(expand("Mango Lassi", "", &[]).contains(TAG_DRINK));
        assert!(expand("House Special", "", &["Beverage"]).contains(TAG_DRINK));
        assert!(!expand("Chicken Tikka", "", &[]).contains(TAG_DRINK));
    }

    #[test]
    fn test_substring_false_positive_is_kept() {
        let tags = expand("New York Cheesecake", "", &[]);
        assert!(tags.contains(TAG_VEGETARIAN));
    }

    #[test]
    fn test_render_tags() {
        let tags = expand("Water", "", &["b", "a"]);
        assert_eq!(render_tags(&tags), "a b");
    }
}
