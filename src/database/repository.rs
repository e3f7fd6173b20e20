use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Drink, DrinkChanges, NewDrink, Recipe};

/// Storage seam for the drink menu. Handlers only see this trait.
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks, ordered by id ascending
    async fn list(&self) -> Result<Vec<Drink>, DatabaseError>;

    async fn get(&self, id: i32) -> Result<Option<Drink>, DatabaseError>;

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError>;

    /// Apply only the supplied fields; absent fields keep their stored value
    async fn update(&self, id: i32, changes: DrinkChanges) -> Result<Drink, DatabaseError>;

    async fn delete(&self, id: i32) -> Result<(), DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Row as stored: the recipe is serialized JSON text
#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i32,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = DatabaseError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = Recipe::from_json(&row.recipe)
            .map_err(|source| DatabaseError::CorruptRecipe { id: row.id, source })?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

pub struct PgDrinkRepository {
    pool: PgPool,
}

impl PgDrinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrinkRepository for PgDrinkRepository {
    async fn list(&self) -> Result<Vec<Drink>, DatabaseError> {
        sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Drink::try_from)
            .collect()
    }

    async fn get(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Drink::try_from)
            .transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = drink.recipe.to_json()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drink (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created drink {} ({})", row.id, row.title);
        Drink::try_from(row)
    }

    async fn update(&self, id: i32, changes: DrinkChanges) -> Result<Drink, DatabaseError> {
        let recipe = changes.recipe.as_ref().map(Recipe::to_json).transpose()?;

        // COALESCE keeps the stored column untouched when a field is absent
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drink
            SET title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(recipe.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("drink {}", id)))?;

        tracing::info!("Updated drink {}", row.id);
        Drink::try_from(row)
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM drink WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("drink {}", id)));
        }

        tracing::info!("Deleted drink {}", id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
