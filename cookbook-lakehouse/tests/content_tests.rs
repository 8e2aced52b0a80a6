//! Recipe catalog integration tests: gated writes, filters, slugs

use tempfile::TempDir;

use cookbook_lakehouse::config::{CookbookConfig, HashWorkFactor};
use cookbook_lakehouse::{
    Cookbook, ErrorKind, PageRequest, RecipeDraft, RecipeFilter, RecipePatch, RecipeQuery,
    SessionClaims, SortOrder,
};

struct Kitchen {
    _dir: TempDir,
    cookbook: Cookbook,
    admin_id: String,
    admin: SessionClaims,
    cook_id: String,
    cook: SessionClaims,
}

async fn kitchen() -> Kitchen {
    let dir = TempDir::new().unwrap();
    let config = CookbookConfig::new(dir.path())
        .with_token_secret("content-tests-signing-secret")
        .with_hash_work_factor(HashWorkFactor::new(1024, 1, 1));
    let cookbook = Cookbook::open(config).await.unwrap();

    let admin_view = cookbook
        .auth()
        .ensure_admin("Chef".into(), "chef@example.com".into(), "Tarragon9".into())
        .await
        .unwrap();
    let admin_token = cookbook
        .auth()
        .login("chef@example.com".into(), "Tarragon9".into())
        .await
        .unwrap()
        .token;

    let cook_view = cookbook
        .auth()
        .register("Ana".into(), "ana@example.com".into(), "Saffron1".into())
        .await
        .unwrap();
    let cook_token = cookbook
        .auth()
        .login("ana@example.com".into(), "Saffron1".into())
        .await
        .unwrap()
        .token;

    let admin = cookbook.gate().authenticate(Some(&admin_token)).unwrap();
    let cook = cookbook.gate().authenticate(Some(&cook_token)).unwrap();
    Kitchen {
        _dir: dir,
        cookbook,
        admin_id: admin_view.id,
        admin,
        cook_id: cook_view.id,
        cook,
    }
}

fn draft(title: &str, preparation: &str, ingredients: &str) -> RecipeDraft {
    RecipeDraft {
        title: title.into(),
        preparation: preparation.into(),
        ingredients: ingredients.into(),
        image: None,
    }
}

#[tokio::test]
async fn test_admin_creates_recipe_with_slug() {
    let k = kitchen().await;

    let recipe = k
        .cookbook
        .recipes()
        .create(
            &k.admin,
            &k.admin_id,
            draft("Grandma's Apple Pie!", "Bake for 45 minutes", "apples"),
        )
        .await
        .unwrap();

    assert_eq!(recipe.slug, "grandmas-apple-pie");
    assert_eq!(recipe.owner_id, k.admin_id);

    let fetched = k.cookbook.recipes().get(&recipe.id).await.unwrap();
    assert_eq!(fetched, recipe);
}

#[tokio::test]
async fn test_standard_identity_cannot_mutate_recipes() {
    let k = kitchen().await;

    let err = k
        .cookbook
        .recipes()
        .create(&k.cook, &k.cook_id, draft("Toast", "Toast the bread", "bread"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let recipe = k
        .cookbook
        .recipes()
        .create(&k.admin, &k.admin_id, draft("Toast", "Toast the bread", "bread"))
        .await
        .unwrap();

    let err = k
        .cookbook
        .recipes()
        .update(&k.cook, &k.cook_id, &recipe.id, RecipePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = k
        .cookbook
        .recipes()
        .delete(&k.cook, &k.cook_id, &recipe.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(k.cookbook.recipes().get(&recipe.id).await.is_ok());
}

#[tokio::test]
async fn test_create_owner_is_the_authorized_admin() {
    let k = kitchen().await;

    let err = k
        .cookbook
        .recipes()
        .create(&k.cook, &k.admin_id, draft("Toast", "Toast the bread", "bread"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let listing = k.cookbook.recipes().list(RecipeQuery::default()).await.unwrap();
    assert_eq!(listing.total, 0);

    let recipe = k
        .cookbook
        .recipes()
        .create(&k.admin, &k.admin_id, draft("Toast", "Toast the bread", "bread"))
        .await
        .unwrap();
    assert_eq!(recipe.owner_id, k.admin_id);
}

#[tokio::test]
async fn test_unknown_acting_as_is_not_found() {
    let k = kitchen().await;

    let err = k
        .cookbook
        .recipes()
        .create(&k.admin, "missing-identity", draft("Soup", "Simmer", "water"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_requires_title_and_preparation() {
    let k = kitchen().await;

    let err = k
        .cookbook
        .recipes()
        .create(&k.admin, &k.admin_id, draft("", "Stir", "flour"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let listing = k.cookbook.recipes().list(RecipeQuery::default()).await.unwrap();
    assert_eq!(listing.total, 0);
}

#[tokio::test]
async fn test_update_keeps_slug() {
    let k = kitchen().await;

    let recipe = k
        .cookbook
        .recipes()
        .create(&k.admin, &k.admin_id, draft("Pad Thai", "Fry noodles", "noodles"))
        .await
        .unwrap();

    let updated = k
        .cookbook
        .recipes()
        .update(
            &k.admin,
            &k.admin_id,
            &recipe.id,
            RecipePatch {
                title: Some("Pad See Ew".into()),
                image: Some("https://img.example/pse.jpg".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Pad See Ew");
    assert_eq!(updated.slug, "pad-thai");
    assert!(updated.updated_at >= recipe.updated_at);

    let fetched = k.cookbook.recipes().get(&recipe.id).await.unwrap();
    assert_eq!(fetched.title, "Pad See Ew");
    assert_eq!(fetched.image.as_deref(), Some("https://img.example/pse.jpg"));
    assert_eq!(fetched.preparation, "Fry noodles");

    let err = k
        .cookbook
        .recipes()
        .update(&k.admin, &k.admin_id, "missing-recipe", RecipePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let k = kitchen().await;

    let recipe = k
        .cookbook
        .recipes()
        .create(&k.admin, &k.admin_id, draft("Flan", "Set in a bain-marie", "eggs"))
        .await
        .unwrap();

    k.cookbook
        .recipes()
        .delete(&k.admin, &k.admin_id, &recipe.id)
        .await
        .unwrap();
    let err = k
        .cookbook
        .recipes()
        .delete(&k.admin, &k.admin_id, &recipe.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        k.cookbook.recipes().get(&recipe.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_listing_filters_and_counts() {
    let k = kitchen().await;
    let recipes = k.cookbook.recipes();

    recipes
        .create(&k.admin, &k.admin_id, draft("Tomato Soup", "Blend the tomatoes", "tomato"))
        .await
        .unwrap();
    recipes
        .create(&k.admin, &k.admin_id, draft("Shakshuka", "Poach eggs in TOMATO sauce", "eggs"))
        .await
        .unwrap();
    recipes
        .create(&k.admin, &k.admin_id, draft("Lemon Tart", "Bake the curd", "lemon"))
        .await
        .unwrap();

    let all = recipes.list(RecipeQuery::default()).await.unwrap();
    assert_eq!(all.recipes.len(), 3);
    assert_eq!(all.total, 3);
    assert_eq!(all.last_month, 3);
    // Newest update first by default
    assert_eq!(all.recipes[0].title, "Lemon Tart");

    let search = recipes
        .list(RecipeQuery {
            filter: RecipeFilter {
                search_term: Some("tomato".into()),
                ..Default::default()
            },
            page: PageRequest::new(0, 9, SortOrder::Asc),
        })
        .await
        .unwrap();
    let titles: Vec<_> = search.recipes.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Tomato Soup", "Shakshuka"]);

    let by_slug = recipes
        .list(RecipeQuery {
            filter: RecipeFilter {
                slug: Some("lemon-tart".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_slug.recipes.len(), 1);

    let by_ingredient = recipes
        .list(RecipeQuery {
            filter: RecipeFilter {
                ingredient: Some("eggs".into()),
                owner_id: Some(k.admin_id.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_ingredient.recipes.len(), 1);
    assert_eq!(by_ingredient.recipes[0].title, "Shakshuka");

    let nobody = recipes
        .list(RecipeQuery {
            filter: RecipeFilter {
                owner_id: Some(k.cook_id.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(nobody.recipes.is_empty());

    let second_page = recipes
        .list(RecipeQuery {
            page: PageRequest::new(2, 2, SortOrder::Desc),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second_page.recipes.len(), 1);
    assert_eq!(second_page.recipes[0].title, "Tomato Soup");
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let k = kitchen().await;
    let recipes = k.cookbook.recipes();

    recipes
        .create(&k.admin, &k.admin_id, draft("Rye 100%", "Knead well", "rye"))
        .await
        .unwrap();
    recipes
        .create(&k.admin, &k.admin_id, draft("Rye Loaf", "Proof overnight", "rye"))
        .await
        .unwrap();

    let search = |term: &str| RecipeQuery {
        filter: RecipeFilter {
            search_term: Some(term.into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let percent = recipes.list(search("%")).await.unwrap();
    assert_eq!(percent.recipes.len(), 1);
    assert_eq!(percent.recipes[0].title, "Rye 100%");

    let underscore = recipes.list(search("_")).await.unwrap();
    assert!(underscore.recipes.is_empty());
}
