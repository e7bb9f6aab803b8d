use anyhow::{anyhow, Context, Result};
use chrono::Local;
use recipe_catalog::catalog::{load_static_catalog, listing_heading, Catalog, SortKey};
use recipe_catalog::cli::{parse_args, Command, DraftAction};
use recipe_catalog::config::AppConfig;
use recipe_catalog::navigation::{recipe_id_from_target, Category};
use recipe_catalog::recent::{recent_views, record_view};
use recipe_catalog::register::{
    describe_draft, edit_form, load_draft, load_image_data_url, register, save_draft, update,
    RecipeForm,
};
use recipe_catalog::render::{render_card, render_detail, render_recent, render_review, star_bar};
use recipe_catalog::reviews::{resolve_author, submit_review};
use recipe_catalog::storage::{FileStore, JsonStore, USERNAME_KEY};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn build_catalog(config: &AppConfig, store: &FileStore) -> Result<Catalog> {
    let static_recipes = load_static_catalog(&config.catalog_source)
        .await
        .with_context(|| format!("Failed to load static catalog from {:?}", config.catalog_source))?;
    Ok(Catalog::build(static_recipes, store))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli_args = parse_args();
    let config = AppConfig::load(cli_args.catalog.as_deref(), cli_args.store.as_deref());
    let mut store = FileStore::open(&config.store_dir)
        .with_context(|| format!("Failed to open store at {}", config.store_dir.display()))?;
    info!(store = %config.store_dir.display(), "store opened");

    match cli_args.command {
        Command::List { category, sort } => {
            let category = category
                .as_deref()
                .map(str::parse::<Category>)
                .transpose()?;
            let sort: SortKey = sort.parse().map_err(|e: String| anyhow!(e))?;

            let catalog = build_catalog(&config, &store).await?;
            let recipes = catalog.list(category, sort);
            println!("{}", listing_heading(category, recipes.len()));
            for recipe in &recipes {
                println!("{}", render_card(recipe));
            }
        }
        Command::Show { target } => {
            let recipe_id = recipe_id_from_target(&target)
                .ok_or_else(|| anyhow!("레시피 ID가 없습니다. 예: recipe.html?id=kimchi_fried_rice"))?;
            let catalog = build_catalog(&config, &store).await?;
            let recipe = catalog.require(&recipe_id)?;
            print!("{}", render_detail(recipe));
            record_view(&mut store, recipe, &config.detail_page)?;
        }
        Command::Review {
            recipe_id,
            rating,
            text,
        } => {
            let catalog = build_catalog(&config, &store).await?;
            catalog.require(&recipe_id)?;

            let author = resolve_author(&store);
            let review = submit_review(&mut store, &recipe_id, rating, &text, &author)?;
            println!("{}", render_review(&review));

            let refreshed = build_catalog(&config, &store).await?;
            let recipe = refreshed.require(&recipe_id)?;
            println!(
                "{} ({}점 / {}개 리뷰)",
                star_bar(recipe.rating),
                recipe.rating,
                recipe.review_count
            );
        }
        Command::Recent => {
            let entries = recent_views(&store);
            if entries.is_empty() {
                println!("최근 본 레시피가 없습니다.");
            }
            for entry in &entries {
                println!("{}", render_recent(entry));
            }
        }
        Command::Register {
            form,
            image,
            edit_id,
        } => {
            let image = match &image {
                Some(path) => Some(
                    load_image_data_url(path)
                        .await
                        .with_context(|| format!("Failed to read image {}", path.display()))?,
                ),
                None => None,
            };
            match edit_id {
                Some(id) => {
                    let mut merged = edit_form(&store, &id)?;
                    let changes = RecipeForm::from(form);
                    for (slot, value) in [
                        (&mut merged.title, changes.title),
                        (&mut merged.category, changes.category),
                        (&mut merged.ingredients, changes.ingredients),
                        (&mut merged.steps, changes.steps),
                    ] {
                        if !value.trim().is_empty() {
                            *slot = value;
                        }
                    }
                    let record = update(&mut store, &id, &merged, image)?;
                    println!("레시피가 수정되었습니다! (ID: {})", record.id);
                }
                None => {
                    let record = register(&mut store, &form.into(), image, Local::now())?;
                    println!("레시피가 등록되었습니다! (ID: {})", record.id);
                }
            }
        }
        Command::Draft { action } => match action {
            DraftAction::Save { form, image_name } => {
                let draft = save_draft(&mut store, &form.into(), &image_name, Local::now())?;
                println!("임시저장되었습니다!");
                println!("{}", describe_draft(Some(&draft)));
            }
            DraftAction::Show => {
                let draft = load_draft(&store);
                println!("{}", describe_draft(draft.as_ref()));
                if let Some(draft) = draft {
                    println!("{:#?}", draft.form);
                }
            }
        },
        Command::User { name } => {
            store.set(USERNAME_KEY, name.trim())?;
            println!("{}", resolve_author(&store));
        }
    }

    Ok(())
}
