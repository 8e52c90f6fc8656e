//! `cicada-build rewrite`: rewrite one script against the project's
//! path mappings.

use super::fail;
use cicada_core::{AliasTable, BuildConfig, RewriteImports, SourceText};
use miette::{IntoDiagnostic, Result};
use std::path::Path;

pub fn run(config: &BuildConfig, file: &Path, dest: &Path, json: bool) -> Result<()> {
    let rewritten = rewrite(config, file, dest);
    let unit = match rewritten {
        Ok(unit) => unit,
        Err(e) => fail(&e, json),
    };

    if json {
        let out = serde_json::json!({
            "ok": true,
            "src": unit.src_path,
            "dest": unit.dest_path,
            "contents": unit.contents,
        });
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        print!("{}", unit.contents);
    }
    Ok(())
}

fn rewrite(config: &BuildConfig, file: &Path, dest: &Path) -> cicada_core::Result<SourceText> {
    let aliases = AliasTable::from_tsconfig(&config.tsconfig_path())?;
    let rewriter =
        RewriteImports::new(aliases).with_reserved_prefixes(config.reserved_prefixes.iter().cloned());
    let contents = std::fs::read_to_string(file)?;
    rewriter.rewrite(SourceText {
        src_path: file.to_path_buf(),
        dest_path: dest.to_path_buf(),
        contents,
    })
}
