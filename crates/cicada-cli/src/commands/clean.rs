//! `cicada-build clean` and `cicada-build distclean`.

use super::fail;
use cicada_core::tasks::{clean, distclean};
use cicada_core::BuildConfig;
use miette::Result;

pub fn run(config: &BuildConfig, json: bool) -> Result<()> {
    let removed = match clean(config) {
        Ok(removed) => removed,
        Err(e) => fail(&e, json),
    };

    if json {
        println!("{}", serde_json::json!({ "ok": true, "removed": removed }));
    } else if removed.is_empty() {
        println!("Nothing to clean");
    } else {
        for dir in &removed {
            println!("Removed {}", dir.display());
        }
    }
    Ok(())
}

pub fn run_dist(config: &BuildConfig, json: bool) -> Result<()> {
    let removed = match distclean(config) {
        Ok(removed) => removed,
        Err(e) => fail(&e, json),
    };

    let dist = config.dist_path();
    if json {
        println!(
            "{}",
            serde_json::json!({ "ok": true, "removed": removed, "path": dist })
        );
    } else if removed {
        println!("Removed {}", dist.display());
    } else {
        println!("Nothing to clean");
    }
    Ok(())
}
