//! Cybergunk Armory - forges the named weapon recipes and prints them.

use cybergunk_game::armory::SHOWCASE_KEYS;
use cybergunk_game::describe::{detailed_description, full_name};
use cybergunk_game::{Armory, GameCatalog};
use cybergunk_model::ModelConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cybergunk_game=info,cybergunk_model=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cybergunk Armory");

    let config = ModelConfig::from_env();
    let catalog = GameCatalog::new(&config)?;
    let armory = Armory::new(&catalog);

    for (label, recipe) in armory.recipes() {
        let weapon = recipe.create()?;
        tracing::info!(recipe = label, name = %full_name(&weapon), id = %weapon.id(), "Forged");
        println!("{}", weapon.to_json(&SHOWCASE_KEYS, false)?);
        println!("{}\n", detailed_description(&weapon));
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
