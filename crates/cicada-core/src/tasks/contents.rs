//! The contents task: populate the build tree from the source tree.
//!
//! Script modules get their imports rewritten and their runtime
//! dependencies vendored next to them. Every other module is copied
//! verbatim after its JSON files have been checked.

use super::json::{json_module, validate_json, value_module};
use crate::config::BuildConfig;
use crate::error::Result;
use crate::manifest::read_json_fresh;
use crate::paths::to_slash;
use crate::project::{Module, Pack, Project};
use crate::rewrite::{AliasTable, Candidate, Pattern, RewriteImports};
use crate::select::FileSelector;
use crate::vendor::Vendor;
use cicada_util::fs::write_if_changed;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files copied verbatim into every pack when present at the project root.
pub const LICENSE_FILES: &[&str] = &["LICENSE", "COPYING"];

/// Specifier under which scripts can import the project's `package.json`.
pub const PACKAGE_JSON_ALIAS: &str = "package.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentsReport {
    /// Outputs whose content changed.
    pub written: usize,
    /// Outputs left untouched because they already had the right content.
    pub unchanged: usize,
    /// Vendored packages staged, summed over script modules.
    pub vendored: usize,
    /// Every file this run produced, written or not.
    #[serde(skip)]
    pub outputs: Vec<PathBuf>,
}

impl ContentsReport {
    fn record(&mut self, dest: PathBuf, written: bool) {
        self.outputs.push(dest);
        if written {
            self.written += 1;
        } else {
            self.unchanged += 1;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.written += other.written;
        self.unchanged += other.unchanged;
        self.vendored += other.vendored;
        self.outputs.extend(other.outputs);
        self
    }
}

enum Job<'a> {
    Script {
        pack: &'a Pack,
        module: &'a Module,
        entry: &'a str,
    },
    Copy {
        pack: &'a Pack,
        module: &'a Module,
    },
    License {
        pack: &'a Pack,
    },
}

/// Run the contents task for every pack and module concurrently.
///
/// # Errors
/// Returns the first error hit by any module.
pub fn run(config: &BuildConfig, project: &Project) -> Result<ContentsReport> {
    let mut jobs = Vec::new();
    for pack in &project.packs {
        for module in &pack.modules {
            jobs.push(match module.script_entry() {
                Some(entry) => Job::Script {
                    pack,
                    module,
                    entry,
                },
                None => Job::Copy { pack, module },
            });
        }
        jobs.push(Job::License { pack });
    }

    let has_scripts = jobs.iter().any(|j| matches!(j, Job::Script { .. }));
    let vendor = if has_scripts {
        Vendor::new(&config.package_json(), &config.exclude)?
    } else {
        Vendor::default()
    };

    let report = jobs
        .par_iter()
        .map(|job| match job {
            Job::Script {
                pack,
                module,
                entry,
            } => script(config, &vendor, pack, module, entry),
            Job::Copy { pack, module } => copy(config, pack, module),
            Job::License { pack } => license(config, pack),
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .fold(ContentsReport::default(), ContentsReport::merge);

    info!(
        written = report.written,
        unchanged = report.unchanged,
        vendored = report.vendored,
        "populated build tree"
    );
    Ok(report)
}

/// Alias table for a script module: path mappings first, then vendored
/// packages, then the project's own manifest.
fn script_aliases(config: &BuildConfig, vendor: &Vendor, vendor_root: &Path) -> Result<AliasTable> {
    let mut table = AliasTable::from_tsconfig(&config.tsconfig_path())?;
    table.add_aliases(vendor.aliases(vendor_root)?)?;
    let package_js = to_slash(&vendor_root.join("package.js"));
    table.add(
        PACKAGE_JSON_ALIAS,
        vec![Candidate::destination(Pattern::parse(&package_js)?)],
    )?;
    Ok(table)
}

fn script(
    config: &BuildConfig,
    vendor: &Vendor,
    pack: &Pack,
    module: &Module,
    entry: &str,
) -> Result<ContentsReport> {
    let src_path = config.src_path();
    let build_path = pack.stage_path(&config.build_path());
    let gen_path = pack.stage_path(&config.generated_path());

    // Vendored code lands beside the scripts, under the entry's top directory.
    let script_root = entry.split('/').next().unwrap_or(entry);
    let vendor_root = build_path.join(script_root);

    let rewriter = RewriteImports::new(script_aliases(config, vendor, &vendor_root)?)
        .with_reserved_prefixes(config.reserved_prefixes.iter().cloned());
    let plan = vendor
        .staging_plan(&vendor_root)?
        .with_reserved_prefixes(config.reserved_prefixes.iter().cloned());

    // Rewriting needs the vendored modules and package.js in place.
    let (staged, package_js) = rayon::join(
        || plan.execute(),
        || write_package_js(&config.package_json(), &vendor_root),
    );
    let staged = staged?;
    let mut report = ContentsReport {
        written: staged.written,
        unchanged: staged.unchanged,
        vendored: staged.packages,
        outputs: staged.outputs,
    };
    report.record(vendor_root.join("package.js"), package_js?);

    // Translator output wins over a hand-written file of the same name.
    let selector = FileSelector::new(&module.include)?;
    let manifest_src = config.manifest_src();
    let mut inputs: IndexMap<PathBuf, &Path> = IndexMap::new();
    for rel in selector.select(&src_path)? {
        if src_path.join(&rel) != manifest_src {
            inputs.insert(rel, &src_path);
        }
    }
    for rel in selector.select(&gen_path)? {
        if has_extension(&rel, "js") {
            inputs.insert(rel, &gen_path);
        }
    }
    let inputs: Vec<(PathBuf, &Path)> = inputs.into_iter().collect();

    let outcomes = inputs
        .par_iter()
        .map(|(rel, root)| -> Result<Option<(PathBuf, bool)>> {
            if has_extension(rel, "js") {
                let unit = rewriter.rewrite_file(root, rel, &build_path)?;
                let written = write_output(&unit.dest_path, unit.contents.as_bytes())?;
                Ok(Some((unit.dest_path, written)))
            } else if has_extension(rel, "json") {
                let src = root.join(rel);
                let module_text = json_module(&src, &fs::read(&src)?)?;
                let dest = build_path.join(rel).with_extension("js");
                let written = write_output(&dest, module_text.as_bytes())?;
                Ok(Some((dest, written)))
            } else {
                Ok(None)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    for (dest, written) in outcomes.into_iter().flatten() {
        report.record(dest, written);
    }

    info!(
        pack = %pack.install_dir,
        entry,
        files = inputs.len(),
        vendored = report.vendored,
        "populated script module"
    );
    Ok(report)
}

/// The project's `package.json` as `vendor_root/package.js`.
fn write_package_js(pkg_json: &Path, vendor_root: &Path) -> Result<bool> {
    let meta = read_json_fresh(pkg_json)?;
    write_output(&vendor_root.join("package.js"), value_module(&meta).as_bytes())
}

fn copy(config: &BuildConfig, pack: &Pack, module: &Module) -> Result<ContentsReport> {
    let src_path = config.src_path();
    let build_path = pack.stage_path(&config.build_path());
    let manifest_src = config.manifest_src();

    let files: Vec<PathBuf> = FileSelector::new(&module.include)?
        .select(&src_path)?
        .into_iter()
        .filter(|rel| src_path.join(rel) != manifest_src)
        .collect();

    let outcomes = files
        .par_iter()
        .map(|rel| -> Result<(PathBuf, bool)> {
            let src = src_path.join(rel);
            let bytes = fs::read(&src)?;
            if has_extension(rel, "json") {
                validate_json(&src, &bytes)?;
            }
            let dest = build_path.join(rel);
            let written = write_output(&dest, &bytes)?;
            Ok((dest, written))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut report = ContentsReport::default();
    for (dest, written) in outcomes {
        report.record(dest, written);
    }
    info!(
        pack = %pack.install_dir,
        module = module.kind.as_str(),
        files = files.len(),
        "populated module"
    );
    Ok(report)
}

fn license(config: &BuildConfig, pack: &Pack) -> Result<ContentsReport> {
    let build_path = pack.stage_path(&config.build_path());
    let mut report = ContentsReport::default();
    for name in LICENSE_FILES {
        let src = config.root.join(name);
        if src.is_file() {
            let dest = build_path.join(name);
            let written = write_output(&dest, &fs::read(&src)?)?;
            report.record(dest, written);
        }
    }
    Ok(report)
}

fn write_output(dest: &Path, bytes: &[u8]) -> Result<bool> {
    let written = write_if_changed(dest, bytes)?;
    if written {
        debug!(file = %dest.display(), "wrote");
    }
    Ok(written)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension() == Some(OsStr::new(ext))
}
