//! The project being built: packs, their modules, and the manifests they
//! are shipped with.
//!
//! A project is described by the root `package.json` and by the manifest
//! source in the source tree. The manifest source has an optional `common`
//! object merged under every entry of `packs`.

use crate::error::{Error, Result};
use crate::manifest::{merge_recursive, read_json_fresh};
use crate::paths::absolutize;
use crate::version::{TOOL_NAME, VERSION};
use indexmap::IndexMap;
use semver::Version;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// What kind of content a module carries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleKind {
    Resources,
    Script { language: String, entry: String },
    Data,
    ClientData,
    Interface,
    WorldTemplate,
    SkinPack,
}

impl ModuleKind {
    /// The `type` string used in manifests.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::Script { .. } => "script",
            Self::Data => "data",
            Self::ClientData => "client_data",
            Self::Interface => "interface",
            Self::WorldTemplate => "world_template",
            Self::SkinPack => "skin_pack",
        }
    }

    /// The pack type this module implies, and whether that is final.
    fn pack_type(&self) -> (PackType, bool) {
        match self {
            Self::Resources | Self::ClientData | Self::Interface => (PackType::ResourcePack, true),
            Self::Script { .. } | Self::Data => (PackType::BehaviorPack, true),
            Self::WorldTemplate => (PackType::WorldTemplate, true),
            Self::SkinPack => (PackType::SkinPack, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub description: String,
    pub uuid: Uuid,
    pub version: Version,
    /// Globs relative to the source tree.
    pub include: Vec<String>,
    pub kind: ModuleKind,
}

impl Module {
    /// The script entry point, for script modules.
    #[must_use]
    pub fn script_entry(&self) -> Option<&str> {
        match &self.kind {
            ModuleKind::Script { entry, .. } => Some(entry),
            _ => None,
        }
    }

    #[must_use]
    pub fn manifest(&self) -> Value {
        let mut out = json!({
            "description": self.description,
            "type": self.kind.as_str(),
            "uuid": self.uuid.to_string(),
            "version": triplet(&self.version),
        });
        if let ModuleKind::Script { language, entry } = &self.kind {
            out["language"] = json!(language);
            out["entry"] = json!(entry);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyTarget {
    Uuid(Uuid),
    Module(String),
}

/// Another pack or a host script module this pack needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub target: DependencyTarget,
    pub version: Version,
}

impl Dependency {
    #[must_use]
    pub fn manifest(&self) -> Value {
        let mut out = Map::new();
        match &self.target {
            DependencyTarget::Uuid(uuid) => out.insert("uuid".into(), json!(uuid.to_string())),
            DependencyTarget::Module(name) => out.insert("module_name".into(), json!(name)),
        };
        out.insert("version".into(), triplet(&self.version));
        Value::Object(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub authors: Option<Vec<String>>,
    pub license: Option<String>,
    pub generated_with: IndexMap<String, Vec<Version>>,
    pub url: Option<String>,
}

impl Metadata {
    #[must_use]
    pub fn manifest(&self) -> Value {
        let mut out = Map::new();
        if let Some(authors) = &self.authors {
            out.insert("authors".into(), json!(authors));
        }
        if let Some(license) = &self.license {
            out.insert("license".into(), json!(license));
        }
        if !self.generated_with.is_empty() {
            let tools: Map<String, Value> = self
                .generated_with
                .iter()
                .map(|(name, versions)| {
                    let versions: Vec<String> = versions.iter().map(ToString::to_string).collect();
                    (name.clone(), json!(versions))
                })
                .collect();
            out.insert("generated_with".into(), Value::Object(tools));
        }
        if let Some(url) = &self.url {
            out.insert("url".into(), json!(url));
        }
        Value::Object(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackType {
    BehaviorPack,
    ResourcePack,
    SkinPack,
    WorldTemplate,
}

impl PackType {
    /// Suffix distinguishing packs of a multi-pack project.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::BehaviorPack => "bp",
            Self::ResourcePack => "rp",
            Self::SkinPack => "skins",
            Self::WorldTemplate => "wt",
        }
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BehaviorPack => "BehaviorPack",
            Self::ResourcePack => "ResourcePack",
            Self::SkinPack => "SkinPack",
            Self::WorldTemplate => "WorldTemplate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    pub name: String,
    pub uuid: Uuid,
    pub description: String,
    pub version: Version,
    pub icon: Option<PathBuf>,
    pub min_engine_version: Option<Version>,
    /// World templates only.
    pub base_game_version: Option<Version>,
    /// World templates only.
    pub lock_template_options: Option<bool>,
    pub modules: Vec<Module>,
    pub dependencies: Vec<Dependency>,
    pub capabilities: Vec<String>,
    pub metadata: Metadata,
    pub pack_type: PackType,
    /// Sub-directory inside the archive; `None` for single-pack projects.
    pub archive_sub_dir: Option<String>,
    /// Directory name the pack is installed under.
    pub install_dir: String,
}

impl Pack {
    /// Where this pack's files live under a staging root.
    #[must_use]
    pub fn stage_path(&self, root: &Path) -> PathBuf {
        match &self.archive_sub_dir {
            Some(sub) => root.join(sub),
            None => root.to_path_buf(),
        }
    }

    /// The pack's `manifest.json`.
    #[must_use]
    pub fn manifest(&self) -> Value {
        let mut header = Map::new();
        header.insert("name".into(), json!(self.name));
        header.insert("uuid".into(), json!(self.uuid.to_string()));
        header.insert("description".into(), json!(self.description));
        header.insert("version".into(), triplet(&self.version));
        if let Some(v) = &self.min_engine_version {
            header.insert("min_engine_version".into(), triplet(v));
        }
        if let Some(v) = &self.base_game_version {
            header.insert("base_game_version".into(), triplet(v));
        }
        if let Some(lock) = self.lock_template_options {
            header.insert("lock_template_options".into(), json!(lock));
        }

        let mut out = Map::new();
        out.insert("format_version".into(), json!(2));
        out.insert("header".into(), Value::Object(header));
        out.insert(
            "modules".into(),
            Value::Array(self.modules.iter().map(Module::manifest).collect()),
        );
        if !self.dependencies.is_empty() {
            out.insert(
                "dependencies".into(),
                Value::Array(self.dependencies.iter().map(Dependency::manifest).collect()),
            );
        }
        if !self.capabilities.is_empty() {
            out.insert("capabilities".into(), json!(self.capabilities));
        }
        let metadata = self.metadata.manifest();
        if metadata.as_object().is_some_and(|m| !m.is_empty()) {
            out.insert("metadata".into(), metadata);
        }
        Value::Object(out)
    }

    fn from_src(src: PackSrc, src_dir: &Path, self_ver: &Version) -> Result<Self> {
        let version = parse_version(&src.version, self_ver)?;

        let modules = src
            .modules
            .into_iter()
            .map(|m| {
                let m = merge_recursive(&json!({ "version": src.version }), &m);
                Module::from_src(m, self_ver)
            })
            .collect::<Result<Vec<_>>>()?;

        let pack_type = derive_pack_type(&modules).ok_or_else(|| {
            Error::invalid_project(format!("pack {}: packs must have at least one module", src.name))
        })?;

        let dependencies = match src.dependencies {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(deps)) => deps
                .into_iter()
                .map(|d| Dependency::from_src(&d, self_ver))
                .collect::<Result<_>>()?,
            // An object is read as {module_name: version} pairs.
            Some(Value::Object(deps)) => deps
                .into_iter()
                .map(|(name, version)| {
                    Dependency::from_src(&json!({"module_name": name, "version": version}), self_ver)
                })
                .collect::<Result<_>>()?,
            Some(_) => {
                return Err(Error::invalid_project(format!(
                    "pack {}: \"dependencies\" must be an array or an object",
                    src.name
                )))
            }
        };

        let metadata = src.metadata.unwrap_or_default();
        let mut generated_with = IndexMap::new();
        for (tool, versions) in metadata.generated_with {
            let versions = versions
                .iter()
                .map(|v| parse_version(v, self_ver))
                .collect::<Result<_>>()?;
            generated_with.insert(tool, versions);
        }
        generated_with.insert(TOOL_NAME.to_string(), vec![parse_version(VERSION, self_ver)?]);

        Ok(Self {
            uuid: parse_uuid(&src.uuid)?,
            name: src.name,
            description: src.description.unwrap_or_default(),
            version,
            icon: src.icon.map(|icon| absolutize(src_dir, icon)),
            min_engine_version: parse_optional_version(src.min_engine_version, self_ver)?,
            base_game_version: parse_optional_version(src.base_game_version, self_ver)?,
            lock_template_options: src.lock_template_options,
            modules,
            dependencies,
            capabilities: src.capabilities.unwrap_or_default(),
            metadata: Metadata {
                authors: metadata.authors,
                license: metadata.license,
                generated_with,
                url: metadata.url,
            },
            pack_type,
            archive_sub_dir: None,
            install_dir: String::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub version: Version,
    pub packs: Vec<Pack>,
}

impl Project {
    /// Load the project from the root `package.json` and the manifest source.
    ///
    /// Both files are read fresh on every call.
    ///
    /// # Errors
    /// Returns a config read/parse error, or [`Error::InvalidProject`] if the
    /// description is incomplete or inconsistent.
    pub fn load(pkg_json_path: &Path, manifest_src: &Path) -> Result<Self> {
        let meta = read_json_fresh(pkg_json_path)?;
        let src = read_json_fresh(manifest_src)?;
        let src_dir = manifest_src.parent().unwrap_or(Path::new("."));

        let name = meta
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_project("package.json has no \"name\""))?
            .to_string();
        let version_str = meta
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_project("package.json has no \"version\""))?;
        let version = Version::parse(version_str)
            .map_err(|e| Error::invalid_project(format!("Unparsable version: {version_str}: {e}")))?;

        let defaults = json!({
            "name": name,
            "description": meta.get("description"),
            "version": version_str,
            "metadata": {
                "authors": authors(&meta),
                "license": meta.get("license"),
                "url": meta.get("homepage"),
            }
        });
        let common = merge_recursive(&defaults, src.get("common").unwrap_or(&json!({})));

        let packs_src = src
            .get("packs")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::invalid_project("manifest has no \"packs\" array"))?;
        if packs_src.is_empty() {
            return Err(Error::invalid_project("a project must have at least one pack"));
        }

        let mut packs = packs_src
            .iter()
            .map(|p| {
                let merged = merge_recursive(&common, p);
                let pack_src: PackSrc = serde_json::from_value(merged)
                    .map_err(|e| Error::invalid_project(format!("invalid pack: {e}")))?;
                Pack::from_src(pack_src, src_dir, &version)
            })
            .collect::<Result<Vec<_>>>()?;

        assign_dir_names(&name, &mut packs);
        debug!(project = %name, packs = packs.len(), "loaded project");

        Ok(Self {
            name,
            version,
            packs,
        })
    }

    /// File name of the distributable archive.
    #[must_use]
    pub fn archive_name(&self) -> String {
        let basename = format!("{}-{}", self.name, self.version);
        if self.packs.len() > 1 {
            format!("{basename}.mcaddon")
        } else if self.packs.first().map(|p| p.pack_type) == Some(PackType::WorldTemplate) {
            format!("{basename}.mctemplate")
        } else {
            format!("{basename}.mcpack")
        }
    }
}

fn assign_dir_names(project: &str, packs: &mut [Pack]) {
    if let [only] = packs {
        only.archive_sub_dir = None;
        only.install_dir = project.to_string();
        return;
    }

    let mut num_of: HashMap<PackType, usize> = HashMap::new();
    for pack in packs.iter() {
        *num_of.entry(pack.pack_type).or_default() += 1;
    }

    let mut idx_of: HashMap<PackType, usize> = HashMap::new();
    for pack in packs.iter_mut() {
        let suffix = pack.pack_type.suffix();
        let dir = if num_of[&pack.pack_type] == 1 {
            format!("{project}-{suffix}")
        } else {
            let idx = idx_of.entry(pack.pack_type).or_default();
            let dir = format!("{project}-{suffix}-{idx}");
            *idx += 1;
            dir
        };
        pack.archive_sub_dir = Some(dir.clone());
        pack.install_dir = dir;
    }
}

/// The first decisive module wins; skin pack modules can be overridden.
fn derive_pack_type(modules: &[Module]) -> Option<PackType> {
    let mut found = None;
    for module in modules {
        let (pack_type, decisive) = module.kind.pack_type();
        found = Some(pack_type);
        if decisive {
            break;
        }
    }
    found
}

/// `major.minor.patch` as an array, or the full string for prereleases.
fn triplet(version: &Version) -> Value {
    if version.pre.is_empty() {
        json!([version.major, version.minor, version.patch])
    } else {
        json!(version.to_string())
    }
}

fn parse_version(s: &str, self_ver: &Version) -> Result<Version> {
    if s == "self" {
        return Ok(self_ver.clone());
    }
    Version::parse(s).map_err(|e| Error::invalid_project(format!("Unparsable version: {s}: {e}")))
}

fn parse_optional_version(s: Option<String>, self_ver: &Version) -> Result<Option<Version>> {
    s.map(|s| parse_version(&s, self_ver)).transpose()
}

/// `author` and `contributors` of a package manifest, as strings.
fn authors(meta: &Value) -> Vec<String> {
    fn person(p: &Value) -> Option<String> {
        match p {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => {
                let mut s = o.get("name")?.as_str()?.to_string();
                if let Some(email) = o.get("email").and_then(Value::as_str) {
                    s.push_str(&format!(" <{email}>"));
                }
                if let Some(url) = o.get("url").and_then(Value::as_str) {
                    s.push_str(&format!(" ({url})"));
                }
                Some(s)
            }
            _ => None,
        }
    }

    let mut out: Vec<String> = meta.get("author").and_then(person).into_iter().collect();
    if let Some(contributors) = meta.get("contributors").and_then(Value::as_array) {
        out.extend(contributors.iter().filter_map(person));
    }
    out
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::invalid_project(format!("invalid uuid {s:?}: {e}")))
}

#[derive(Deserialize)]
struct PackSrc {
    name: String,
    uuid: String,
    description: Option<String>,
    version: String,
    icon: Option<String>,
    min_engine_version: Option<String>,
    base_game_version: Option<String>,
    lock_template_options: Option<bool>,
    modules: Vec<Value>,
    dependencies: Option<Value>,
    capabilities: Option<Vec<String>>,
    metadata: Option<MetadataSrc>,
}

#[derive(Deserialize, Default)]
struct MetadataSrc {
    authors: Option<Vec<String>>,
    license: Option<String>,
    #[serde(default)]
    generated_with: IndexMap<String, Vec<String>>,
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Include {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct ModuleSrc {
    description: Option<String>,
    uuid: String,
    version: String,
    include: Include,
    #[serde(flatten)]
    kind: ModuleKind,
}

impl Module {
    fn from_src(src: Value, self_ver: &Version) -> Result<Self> {
        match src.get("type").and_then(Value::as_str) {
            Some("javascript") => {
                return Err(Error::invalid_project(
                    "\"javascript\" is a deprecated module type. Use \"script\" instead.",
                ))
            }
            None => return Err(Error::invalid_project("module has no \"type\"")),
            Some(_) => {}
        }
        let src: ModuleSrc = serde_json::from_value(src)
            .map_err(|e| Error::invalid_project(format!("invalid module: {e}")))?;

        Ok(Self {
            description: src.description.unwrap_or_default(),
            uuid: parse_uuid(&src.uuid)?,
            version: parse_version(&src.version, self_ver)?,
            include: match src.include {
                Include::One(glob) => vec![glob],
                Include::Many(globs) => globs,
            },
            kind: src.kind,
        })
    }
}

impl Dependency {
    fn from_src(src: &Value, self_ver: &Version) -> Result<Self> {
        let target = if let Some(uuid) = src.get("uuid").and_then(Value::as_str) {
            DependencyTarget::Uuid(parse_uuid(uuid)?)
        } else if let Some(name) = src.get("module_name").and_then(Value::as_str) {
            DependencyTarget::Module(name.to_string())
        } else {
            return Err(Error::invalid_project(
                "dependency needs either \"uuid\" or \"module_name\"",
            ));
        };
        let version = src
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_project("dependency has no \"version\""))?;
        Ok(Self {
            target,
            version: parse_version(version, self_ver)?,
        })
    }
}
