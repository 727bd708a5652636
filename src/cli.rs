//! Minimal CLI: schema → (nodes | checked round-trip | edited schema)
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use tracing::info;

use schema_nodemap::{build_document, build_node_map, path_de, NodeMap};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert JSON Schema documents to editable node maps and back, or apply one structural edit
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert a schema document into its node map (JSON)
    Nodes(NodesOut),
    /// convert a saved node map back into a schema document
    Emit(EmitOut),
    /// round-trip every input and report the ones that do not come back identical
    Check(CheckOut),
    /// remove the subtree at a pointer
    Remove(RemoveOut),
    /// rename one pointer segment (e.g. a property name)
    Rename(RenameOut),
    /// add a property, definition or combinator member under a node
    Add(AddOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /components/schemas/Order)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct EditInput {
    /// schema document to edit
    #[arg(long, short)]
    input: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct NodesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct EmitOut {
    /// node map produced by `nodes`
    #[arg(long, short)]
    input: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct RemoveOut {
    #[command(flatten)]
    edit: EditInput,

    /// node pointer to remove (e.g. '#/properties/name')
    #[arg(long)]
    pointer: String,
}

#[derive(clap::Parser, Debug)]
struct RenameOut {
    #[command(flatten)]
    edit: EditInput,

    #[arg(long)]
    from: String,

    #[arg(long)]
    to: String,
}

#[derive(clap::Parser, Debug)]
struct AddOut {
    #[command(flatten)]
    edit: EditInput,

    /// pointer of the node receiving the child
    #[arg(long, default_value = "#")]
    parent: String,

    /// property or definition name (ignored for combinator members)
    #[arg(long, default_value = "")]
    name: String,

    /// add under `$defs` instead of `properties`
    #[arg(long, default_value_t = false)]
    definition: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<(PathBuf, Value)>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        source_paths
            .into_iter()
            .map(|source_path| {
                let document = read_json(&source_path)?;
                let document = match self.json_pointer.as_deref() {
                    None => document,
                    Some(ptr) => document.pointer(ptr).cloned().ok_or_else(|| {
                        anyhow!("JSON pointer {ptr} matched nothing in {}", source_path.display())
                    })?,
                };
                Ok((source_path, document))
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `Ok(false)` means the command ran but found problems (failed round-trips).
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Nodes(target) => {
                let documents = target.input_settings.load_documents()?;
                let mut maps = Vec::with_capacity(documents.len());
                for (source_path, document) in &documents {
                    let map = build_node_map(document)
                        .with_context(|| format!("failed to convert {}", source_path.display()))?;
                    info!(path = %source_path.display(), nodes = map.len(), "converted");
                    maps.push(map);
                }
                let out = match maps.len() {
                    1 => serde_json::to_string_pretty(&maps[0])?,
                    _ => serde_json::to_string_pretty(&maps)?,
                };
                write_output(target.out.as_deref(), &out)?;
                Ok(true)
            }
            Command::Emit(target) => {
                let source = std::fs::read_to_string(&target.input)
                    .with_context(|| format!("failed to read {}", target.input.display()))?;
                let map = path_de::node_map_from_str(&source)
                    .with_context(|| format!("failed to load node map {}", target.input.display()))?;
                let out = serde_json::to_string_pretty(&build_document(&map))?;
                write_output(target.out.as_deref(), &out)?;
                Ok(true)
            }
            Command::Check(target) => {
                let documents = target.input_settings.load_documents()?;
                let reports: Vec<(PathBuf, std::result::Result<(), String>)> = documents
                    .into_par_iter()
                    .map(|(source_path, document)| {
                        let outcome = check_round_trip(&document);
                        (source_path, outcome)
                    })
                    .collect();
                let mut all_ok = true;
                for (source_path, outcome) in reports {
                    match outcome {
                        Ok(()) => println!("{} {}", "ok  ".green(), source_path.display()),
                        Err(reason) => {
                            all_ok = false;
                            println!("{} {}: {reason}", "FAIL".red().bold(), source_path.display());
                        }
                    }
                }
                Ok(all_ok)
            }
            Command::Remove(target) => {
                edit_document(&target.edit, |map| {
                    map.remove(&target.pointer)?;
                    Ok(())
                })?;
                Ok(true)
            }
            Command::Rename(target) => {
                edit_document(&target.edit, |map| {
                    map.rename(&target.from, &target.to)?;
                    Ok(())
                })?;
                Ok(true)
            }
            Command::Add(target) => {
                edit_document(&target.edit, |map| {
                    let parent = map
                        .find(&target.parent)
                        .map(|node| node.node_id)
                        .ok_or_else(|| anyhow!("no node at {}", target.parent))?;
                    let child = map.create_child(parent, &target.name, target.definition)?;
                    map.insert(child)?;
                    Ok(())
                })?;
                Ok(true)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn edit_document(edit: &EditInput, apply: impl FnOnce(&mut NodeMap) -> Result<()>) -> Result<()> {
    let document = read_json(&edit.input)?;
    let mut map = build_node_map(&document)
        .with_context(|| format!("failed to convert {}", edit.input.display()))?;
    apply(&mut map)?;
    let out = serde_json::to_string_pretty(&build_document(&map))?;
    write_output(edit.out.as_deref(), &out)
}

fn check_round_trip(document: &Value) -> std::result::Result<(), String> {
    let map = build_node_map(document).map_err(|error| error.to_string())?;
    map.validate().map_err(|error| error.to_string())?;
    let rebuilt = build_document(&map);
    match first_difference(document, &rebuilt, String::new()) {
        None => Ok(()),
        Some(at) => Err(format!("output differs at /{at}")),
    }
}

/// JSON Pointer (without the leading `/`) of the first place `a` and `b` disagree.
fn first_difference(a: &Value, b: &Value, at: String) -> Option<String> {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            let keys = x.keys().chain(y.keys().filter(|k| !x.contains_key(*k)));
            for key in keys {
                let here = join_path(&at, key);
                match (x.get(key), y.get(key)) {
                    (Some(xv), Some(yv)) => {
                        if let Some(found) = first_difference(xv, yv, here) {
                            return Some(found);
                        }
                    }
                    _ => return Some(here),
                }
            }
            None
        }
        (Value::Array(x), Value::Array(y)) if x.len() == y.len() => x
            .iter()
            .zip(y)
            .enumerate()
            .find_map(|(i, (xv, yv))| first_difference(xv, yv, join_path(&at, &i.to_string()))),
        _ if a == b => None,
        _ => Some(at),
    }
}

fn join_path(at: &str, segment: &str) -> String {
    let segment = schema_nodemap::pointer::escape_segment(segment);
    if at.is_empty() { segment.into_owned() } else { format!("{at}/{segment}") }
}

fn read_json(source_path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file {}", source_path.display()))?;
    serde_json::from_str::<Value>(&source)
        .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
