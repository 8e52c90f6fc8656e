//! `cicada-build vendor`: a dry run of dependency vendoring.

use super::fail;
use cicada_core::vendor::StagingTask;
use cicada_core::{BuildConfig, Vendor};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct AliasJson {
    key: String,
    candidates: Vec<String>,
}

#[derive(Serialize)]
struct VendorJson<'a> {
    ok: bool,
    vendor_root: &'a Path,
    packages: &'a [StagingTask],
    aliases: Vec<AliasJson>,
}

pub fn run(config: &BuildConfig, vendor_root: &Path, json: bool) -> Result<()> {
    let planned = Vendor::new(&config.package_json(), &config.exclude).and_then(|vendor| {
        let aliases = vendor.aliases(vendor_root)?;
        let plan = vendor.staging_plan(vendor_root)?;
        Ok((aliases, plan))
    });
    let (aliases, plan) = match planned {
        Ok(planned) => planned,
        Err(e) => fail(&e, json),
    };

    let aliases: Vec<AliasJson> = aliases
        .into_iter()
        .map(|(key, candidates)| AliasJson {
            key,
            candidates: candidates.iter().map(|c| c.path.to_string()).collect(),
        })
        .collect();

    if json {
        let out = VendorJson {
            ok: true,
            vendor_root,
            packages: plan.tasks(),
            aliases,
        };
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
        return Ok(());
    }

    if plan.tasks().is_empty() {
        println!("Nothing to vendor");
        return Ok(());
    }
    for task in plan.tasks() {
        println!(
            "{}: {} -> {} [{}]",
            task.package,
            task.src_dir.display(),
            task.dest_dir.display(),
            task.files.join(", ")
        );
    }
    println!();
    for alias in &aliases {
        println!("{} -> {}", alias.key, alias.candidates.join(", "));
    }
    Ok(())
}
