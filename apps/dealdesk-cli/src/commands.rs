//! Subcommand implementations

use dealdesk_categories::SelectionMode;
use dealdesk_client::{
    CategoryTree, ClientConfig, CollectingNotifier, ExpandOutcome, NotificationLevel,
    RestCategoryApi, SelectOutcome,
};

use crate::output;
use crate::Command;

type Tree = CategoryTree<RestCategoryApi, CollectingNotifier>;

pub async fn run(command: Command, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Tree {
            admin,
            expand,
            json,
        } => {
            let mode = if admin {
                SelectionMode::Admin
            } else {
                SelectionMode::Community
            };
            let tree = open(&config, mode)?;
            let result = tree_command(&tree, &expand, json).await;
            flush(&tree);
            result
        }
        Command::Deals {
            category_id,
            expand,
        } => {
            let tree = open(&config, SelectionMode::Admin)?;
            let result = deals_command(&tree, &category_id, &expand).await;
            flush(&tree);
            result
        }
        Command::Subscribe { toggle, expand } => {
            let tree = open(&config, SelectionMode::Community)?;
            let result = subscribe_command(&tree, &toggle, &expand).await;
            flush(&tree);
            result
        }
    }
}

fn open(config: &ClientConfig, mode: SelectionMode) -> Result<Tree, Box<dyn std::error::Error>> {
    let api = RestCategoryApi::from_config(config)?;
    let mut tree = CategoryTree::new(api, mode)
        .with_notifier(CollectingNotifier::new())
        .with_min_discount(config.min_discount);
    if let Some(user_id) = &config.user_id {
        tree = tree.with_user(user_id.clone());
    }
    Ok(tree)
}

async fn expand_all(tree: &Tree, ids: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for id in ids {
        match tree.toggle_expand(id).await? {
            ExpandOutcome::NotFound => tracing::warn!("Category {} is not loaded", id),
            ExpandOutcome::NoChildren => tracing::info!("Category {} has no subcategories", id),
            _ => {}
        }
    }
    Ok(())
}

async fn tree_command(tree: &Tree, expand: &[String], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    tree.load_roots().await?;
    expand_all(tree, expand).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree.render())?);
    } else {
        print!("{}", tree.format_tree());
    }
    Ok(())
}

async fn deals_command(
    tree: &Tree,
    category_id: &str,
    expand: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    tree.load_roots().await?;
    expand_all(tree, expand).await?;

    match tree.toggle_selected(category_id).await? {
        SelectOutcome::NotFound => {
            return Err(format!("Category {} is not in the tree", category_id).into());
        }
        _ => {
            let products = tree.discounted_products().unwrap_or_default();
            if products.is_empty() {
                println!("No discounted products in category {}", category_id);
            } else {
                println!("{}", output::products_table(&products));
            }
        }
    }
    Ok(())
}

async fn subscribe_command(
    tree: &Tree,
    toggle: &[String],
    expand: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    tree.load_roots().await?;
    expand_all(tree, expand).await?;

    for id in toggle {
        if tree.toggle_selected(id).await? == SelectOutcome::NotFound {
            tracing::warn!("Category {} is not loaded; expand its parent first", id);
        }
    }

    if !toggle.is_empty() {
        tree.save_categories().await?;
    }
    print!("{}", tree.format_tree());

    let pending = tree.pending_saved();
    if !pending.is_empty() {
        println!("Saved but not loaded: {}", pending.join(", "));
    }
    Ok(())
}

/// Print collected notifications the way the dashboard shows toasts.
fn flush(tree: &Tree) {
    for notification in tree.notifier().drain() {
        match notification.level {
            NotificationLevel::Success => eprintln!("✓ {}", notification.message),
            NotificationLevel::Error => eprintln!("✗ {}", notification.message),
        }
    }
    if tree.notifier().session_was_expired() {
        eprintln!("✗ Session expired; log in again and update your token");
    }
}
