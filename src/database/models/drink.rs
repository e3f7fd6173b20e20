use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One line of a recipe: how many parts of which ingredient, and the colour
/// it is drawn with in the menu graphic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    /// Integer parts or a fractional ratio, kept exactly as submitted
    pub parts: Number,
}

/// Recipe as submitted: a single ingredient or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<OneOrMany> for Recipe {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::Many(ingredients) => Recipe(ingredients),
            OneOrMany::One(ingredient) => Recipe(vec![ingredient]),
        }
    }
}

/// Ordered ingredient list. Always serialized as a JSON array, even when a
/// single ingredient object was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Recipe(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// Public projection of an ingredient: the name is withheld
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .ingredients()
                .iter()
                .map(|i| ShortIngredient {
                    color: i.color.clone(),
                    parts: i.parts.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}

/// Body of POST /drinks. Both fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

/// Body of PATCH /drinks/:id. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

pub const MAX_TITLE_LEN: usize = 80;

fn valid_title(title: &str) -> bool {
    !title.trim().is_empty() && title.chars().count() <= MAX_TITLE_LEN
}

impl NewDrink {
    pub fn is_valid(&self) -> bool {
        valid_title(&self.title) && !self.recipe.is_empty()
    }
}

impl DrinkChanges {
    pub fn is_valid(&self) -> bool {
        self.title.as_deref().map_or(true, valid_title)
            && self.recipe.as_ref().map_or(true, |r| !r.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}
