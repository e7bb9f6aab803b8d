use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::register::RecipeForm;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path or http(s) URL of the static catalog (overrides RECIPE_CATALOG_SOURCE)
    #[arg(short, long, global = true)]
    pub catalog: Option<String>,

    /// Directory holding locally stored data (overrides RECIPE_STORE_DIR)
    #[arg(short, long, global = true)]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recipes, optionally for one category
    List {
        /// korean, western, chinese, dessert or drink
        #[arg(long)]
        category: Option<String>,
        /// review, rating, title, name or views
        #[arg(long, default_value = "review")]
        sort: String,
    },
    /// Show a recipe by id or detail link and remember the visit
    Show { target: String },
    /// Add a review to a recipe
    Review {
        recipe_id: String,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        text: String,
    },
    /// Recently viewed recipes
    Recent,
    /// Register a new recipe, or edit one with --edit-id
    Register {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        edit_id: Option<String>,
    },
    /// Save or show the registration draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Set the display name used for reviews
    User {
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DraftAction {
    Save {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, default_value = "")]
        image_name: String,
    },
    Show,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub category: String,
    /// Comma or newline separated
    #[arg(long, default_value = "")]
    pub ingredients: String,
    /// Blank-line separated steps
    #[arg(long, default_value = "")]
    pub steps: String,
}

impl From<FormArgs> for RecipeForm {
    fn from(args: FormArgs) -> Self {
        RecipeForm {
            title: args.title,
            ingredients: args.ingredients,
            steps: args.steps,
            category: args.category,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
