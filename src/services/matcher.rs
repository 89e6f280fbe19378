use crate::models::MenuItem;
use crate::services::requirements::QueryRequirement;
use crate::services::tag_expander::{expand_tags, item_text, render_tags};
use crate::services::vocabulary::{
    contains_any, find_any, Vocabulary, TAG_DRINK, TAG_SPICY, TAG_VEGAN, TAG_VEGETARIAN,
};
use std::fmt;

/// The first rule an item failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnrequestedDrink,
    NotADrink,
    NotSpicy,
    NotVegetarian,
    ContainsMeat(String),
    NotVegan,
    ContainsAnimalProduct(String),
    MissingKeyword(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnrequestedDrink => write!(f, "drink, but drinks were not requested"),
            Rejection::NotADrink => write!(f, "drinks requested, item is not a drink"),
            Rejection::NotSpicy => write!(f, "no spicy evidence"),
            Rejection::NotVegetarian => write!(f, "no vegetarian evidence"),
            Rejection::ContainsMeat(word) => write!(f, "mentions meat ({})", word),
            Rejection::NotVegan => write!(f, "no vegan evidence"),
            Rejection::ContainsAnimalProduct(word) => {
                write!(f, "mentions animal product ({})", word)
            }
            Rejection::MissingKeyword(word) => write!(f, "missing keyword '{}'", word),
        }
    }
}

/// Applies one parsed requirement to candidate items.
pub struct ItemMatcher<'a> {
    vocab: &'a Vocabulary,
    requirement: &'a QueryRequirement,
}

impl<'a> ItemMatcher<'a> {
    pub fn new(vocab: &'a Vocabulary, requirement: &'a QueryRequirement) -> Self {
        Self { vocab, requirement }
    }

    pub fn matches(&self, item: &MenuItem) -> bool {
        self.evaluate(item).is_ok()
    }

    /// Every requested dimension must pass; stops at the first failure.
    pub fn evaluate(&self, item: &MenuItem) -> Result<(), Rejection> {
        let vocab = self.vocab;
        let req = self.requirement;
        let text = item_text(&item.name, &item.description);
        let tags = expand_tags(&item.name, &item.description, &item.tags, vocab);

        let is_drink = tags.contains(TAG_DRINK) || contains_any(&text, &vocab.drinks);
        match (is_drink, req.drinks) {
            (true, false) => return Err(Rejection::UnrequestedDrink),
            (false, true) => return Err(Rejection::NotADrink),
            _ => {}
        }

        if req.spicy && !(tags.contains(TAG_SPICY) || contains_any(&text, &vocab.spicy)) {
            return Err(Rejection::NotSpicy);
        }

        if req.vegetarian {
            if !(tags.contains(TAG_VEGETARIAN) || contains_any(&text, &vocab.vegetarian)) {
                return Err(Rejection::NotVegetarian);
            }
            if let Some(meat) = find_any(&text, &vocab.meat) {
                return Err(Rejection::ContainsMeat(meat.to_string()));
            }
        }

        if req.vegan {
            if !(tags.contains(TAG_VEGAN) || contains_any(&text, &vocab.vegan)) {
                return Err(Rejection::NotVegan);
            }
            if let Some(product) = find_any(&text, &vocab.non_vegan) {
                return Err(Rejection::ContainsAnimalProduct(product.to_string()));
            }
        }

        if !req.other_keywords.is_empty() {
            let rendered = render_tags(&tags);
            if let Some(missing) = req
                .other_keywords
                .iter()
                .find(|keyword| !text.contains(keyword.as_str()) && !rendered.contains(keyword.as_str()))
            {
                return Err(Rejection::MissingKeyword(missing.clone()));
            }
        }

        Ok(())
    }
}
