//! `cicada-build build`.

use super::fail;
use cicada_core::tasks::{build, BuildReport};
use cicada_core::BuildConfig;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct BuildJson<'a> {
    ok: bool,
    #[serde(flatten)]
    report: &'a BuildReport,
}

pub fn run(config: &BuildConfig, json: bool) -> Result<()> {
    let report = match build(config) {
        Ok(report) => report,
        Err(e) => fail(&e, json),
    };

    if json {
        let out = BuildJson {
            ok: true,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        let c = &report.contents;
        println!(
            "Built {} ({}): {} manifest(s) written, {} file(s) written, {} unchanged, {} stale removed, {} package(s) vendored",
            report.project, report.archive, report.manifests, c.written, c.unchanged, report.removed, c.vendored
        );
    }
    Ok(())
}
