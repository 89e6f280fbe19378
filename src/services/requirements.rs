use crate::services::vocabulary::{contains_any, Vocabulary};
use serde::Serialize;

const MIN_KEYWORD_LEN: usize = 3;

/// What a free-text query asks for, derived fresh for every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryRequirement {
    pub spicy: bool,
    pub vegetarian: bool,
    pub vegan: bool,
    pub drinks: bool,
    /// Leftover words that every accepted item must mention.
    pub other_keywords: Vec<String>,
}

impl QueryRequirement {
    pub fn parse(query: &str, vocab: &Vocabulary) -> Self {
        let query = query.to_lowercase();

        let vegan = contains_any(&query, &vocab.vegan);
        let vegetarian = vegan || contains_any(&query, &vocab.vegetarian);
        let spicy = contains_any(&query, &vocab.spicy);
        let drinks = vocab.drink_query_words().any(|word| query.contains(word));

        let mut other_keywords: Vec<String> = Vec::new();
        for token in query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        {
            if vocab.stop_words.contains(token)
                || is_covered(token, vocab)
                || resembles_drink(token, vocab)
                || other_keywords.iter().any(|k| k == token)
            {
                continue;
            }
            other_keywords.push(token.to_string());
        }

        Self {
            spicy,
            vegetarian,
            vegan,
            drinks,
            other_keywords,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.spicy && !self.vegetarian && !self.vegan && !self.drinks && self.other_keywords.is_empty()
    }
}

/// The token already raised a flag: it contains a flag keyword ("peppers",
/// "vegetables") or is a word of a multi-word one ("plant" in "plant based").
fn is_covered(token: &str, vocab: &Vocabulary) -> bool {
    [&vocab.spicy, &vocab.vegetarian, &vocab.vegan]
        .into_iter()
        .flatten()
        .any(|keyword| {
            token.contains(keyword.as_str()) || keyword.split_whitespace().any(|part| part == token)
        })
}

fn resembles_drink(token: &str, vocab: &Vocabulary) -> bool {
    vocab
        .drink_query_words()
        .any(|keyword| keyword.contains(token) || token.contains(keyword))
}
