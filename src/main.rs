use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use router_sync::config::Config;
use router_sync::logging::init_tracing;
use router_sync::store::{LocationStore, MemoryLocationStore, RouterStateStore};
use router_sync::templates::ActionOptions;
use router_sync::tree::RouterDeclaration;
use router_sync::Manager;

mod cli;

use cli::{Cli, Step};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let declaration = match &cli.tree {
        Some(path) => load_tree(path)?,
        None => match config.tree.clone() {
            Some(tree) => tree,
            None => bail!("No router tree declared: pass --tree or add a [tree] table to the config"),
        },
    };

    let location_store: Arc<dyn LocationStore> = Arc::new(MemoryLocationStore::new(
        cli.location.clone(),
        config.history.capacity,
    ));
    let states = Arc::new(RouterStateStore::new(config.state.history_capacity));
    let manager = Manager::new(&declaration, location_store, states)?;

    for step in &cli.steps {
        apply(&manager, step).with_context(|| format!("Step {step:?} failed"))?;
    }

    print_result(&manager, cli.json)
}

fn load_tree(path: &Path) -> Result<RouterDeclaration> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree file '{}'", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let declaration: RouterDeclaration = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse tree file '{}'", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse tree file '{}'", path.display()))?
    };
    Ok(declaration)
}

fn apply(manager: &Manager, step: &Step) -> Result<()> {
    match step {
        Step::Action {
            router,
            action,
            data,
        } => {
            let options = ActionOptions {
                data: data.clone(),
                ..Default::default()
            };
            manager.dispatch(router, action, options)?;
        }
        Step::Back => manager.back()?,
        Step::Forward => manager.forward()?,
        Step::Go(offset) => manager.go(*offset)?,
    }
    Ok(())
}

fn print_result(manager: &Manager, as_json: bool) -> Result<()> {
    let location = manager.serialized_location();
    let routers = manager.routers();

    if as_json {
        let mut states = Vec::with_capacity(routers.len());
        for name in &routers {
            let state = manager.state(name)?.current;
            states.push(json!({ "name": name, "state": state }));
        }
        let output = json!({ "location": location, "routers": states });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{location}");
    for name in &routers {
        let state = manager.state(name)?.current;
        let mut line = format!("{name}: {}", if state.visible { "visible" } else { "hidden" });
        if let Some(order) = state.order {
            line.push_str(&format!(" order={order}"));
        }
        if let Some(data) = &state.data {
            line.push_str(&format!(" data={data}"));
        }
        println!("{line}");
    }
    Ok(())
}
