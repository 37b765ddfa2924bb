//! CLI: validate JSON documents against a schema document, describe schemas,
//! and try route patterns.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use json_brand::path_de::from_str_with_path;
use json_brand::{
    Outcome, PathMatcher, Registry, RouteOptions, RoutePattern, Schema, Ty, lower_schema,
    pattern_with,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON against json-brand schema documents
#[derive(Parser, Debug)]
#[command(name = "json-brand", version)]
pub struct CommandLineInterface {
    /// debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate each input document against a schema document
    Check(CheckArgs),
    /// load a schema document and print it back in canonical form
    Describe(DescribeArgs),
    /// match paths against a route pattern and print the extracted parameters
    Route(RouteArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckArgs {
    /// schema document (.json)
    #[arg(long, short)]
    schema: PathBuf,

    #[command(flatten)]
    input_settings: InputSettings,

    /// only report failures
    #[arg(long, short)]
    quiet: bool,
}

#[derive(clap::Parser, Debug)]
struct DescribeArgs {
    /// schema document (.json)
    #[arg(long, short)]
    schema: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct RouteArgs {
    /// route pattern, e.g. /items/:id
    #[arg(long, short)]
    pattern: String,

    /// paths to match
    #[arg(long, num_args = 1.., required = true)]
    path: Vec<String>,

    /// schema document for the extracted parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// match letter case exactly
    #[arg(long)]
    sensitive: bool,

    /// require trailing slashes to match exactly
    #[arg(long)]
    strict: bool,
}

/// One loaded input document.
#[derive(Debug)]
struct Document {
    label: String,
    value: Option<Value>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    passed: usize,
    failed: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let label = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {label}"))?;
            tracing::debug!(file = %label, bytes = source.len(), "loaded input");
            if self.ndjson {
                for (index, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let value = serde_json::from_str::<Value>(line).with_context(|| {
                        format!("failed to parse JSON ({label}:{})", index + 1)
                    })?;
                    out.push(self.select(format!("{label}:{}", index + 1), value));
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({label})"))?;
                out.push(self.select(label, value));
            }
        }
        Ok(out)
    }

    fn select(&self, label: String, value: Value) -> Document {
        let value = match self.json_pointer.as_deref() {
            None => Some(value),
            Some(pointer) => value.pointer(pointer).cloned(),
        };
        Document { label, value }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let default = if self.verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                let ty = load_descriptor(&target.schema, &Registry::default())?;
                let documents = target.input_settings.load()?;
                let tally = check(&ty, &documents, target.quiet);
                eprintln!("{} passed, {} failed", tally.passed, tally.failed);
                Ok(if tally.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Describe(target) => {
                let ty = load_descriptor(&target.schema, &Registry::default())?;
                let schema_src = serde_json::to_string_pretty(ty.to_json())?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Route(target) => {
                let options = RouteOptions::default()
                    .sensitive(target.sensitive)
                    .strict(target.strict);
                let matcher = RoutePattern::compile(&target.pattern, options)?;
                let registry = Registry::default().with_route_options(options);
                let typed = match target.params.as_ref() {
                    Some(path) => Some(pattern_with(matcher.clone(), load_descriptor(path, &registry)?)),
                    None => None,
                };
                let mut misses = 0;
                for path in &target.path {
                    match route(&matcher, typed.as_ref(), path) {
                        Some(Ok(value)) => println!("{path} {}", value.to_string().green()),
                        Some(Err(invalid)) => {
                            misses += 1;
                            println!("{path} {} {invalid}", "invalid:".red());
                        }
                        None => {
                            misses += 1;
                            println!("{path} {}", "no match".yellow());
                        }
                    }
                }
                Ok(if misses == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_descriptor(path: &Path, registry: &Registry) -> Result<Ty> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let schema = from_str_with_path::<Schema>(&source)
        .with_context(|| format!("invalid schema document {}", path.display()))?;
    let ty = lower_schema(&schema, registry)
        .with_context(|| format!("cannot build descriptor from {}", path.display()))?;
    tracing::debug!(schema = %path.display(), brand = %ty.brand(), "schema loaded");
    Ok(ty)
}

fn check(ty: &Ty, documents: &[Document], quiet: bool) -> Tally {
    let results: Vec<Outcome<Option<Value>>> = documents
        .par_iter()
        .map(|document| ty.validate_slot(document.value.as_ref()))
        .collect();

    let mut tally = Tally::default();
    for (document, result) in documents.iter().zip(results) {
        match result {
            Ok(_) => {
                tally.passed += 1;
                if !quiet {
                    println!("{}: {}", document.label, "ok".green());
                }
            }
            Err(invalid) => {
                tally.failed += 1;
                let message = invalid.message().replace('\n', "\n    ");
                println!("{}: {} {message}", document.label, "error:".red());
            }
        }
    }
    tally
}

/// `None` when the path does not match; otherwise the raw parameters, or the
/// result of the typed pattern descriptor when one is given.
fn route(matcher: &RoutePattern, typed: Option<&Ty>, path: &str) -> Option<Outcome<Value>> {
    let found = matcher.matches(path)?;
    match typed {
        None => Some(Ok(serde_json::to_value(found).unwrap_or(Value::Null))),
        Some(ty) => Some(ty.validate(&Value::String(path.to_string()))),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
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
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_brand::{number, object};
    use serde_json::json;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_check_arguments() {
        let cli = CommandLineInterface::try_parse_from([
            "json-brand", "check", "--schema", "s.json", "--input", "a.json", "b/*.json", "--ndjson",
        ])
        .unwrap();
        match cli.cmd {
            Command::Check(args) => {
                assert_eq!(args.schema, PathBuf::from("s.json"));
                assert_eq!(args.input_settings.input, ["a.json", "b/*.json"]);
                assert!(args.input_settings.ndjson);
                assert!(!args.quiet);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn input_is_required() {
        assert!(CommandLineInterface::try_parse_from(["json-brand", "check", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn globs_and_literal_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", "1");
        write(dir.path(), "b.json", "2");
        let pattern = format!("{}/*.json", dir.path().display());
        let found = resolve_file_path_patterns([pattern.as_str()]).unwrap();
        assert_eq!(found.len(), 2);

        let empty = format!("{}/*.yaml", dir.path().display());
        assert!(resolve_file_path_patterns([empty.as_str()]).is_err());

        let literal = resolve_file_path_patterns(["does/not/exist.json"]).unwrap();
        assert_eq!(literal, [PathBuf::from("does/not/exist.json")]);
    }

    #[test]
    fn ndjson_and_pointer_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "rows.ndjson", "{\"row\": {\"id\": 1}}\n\n{\"row\": {\"id\": \"x\"}}\n{}\n");
        let settings = InputSettings {
            ndjson: true,
            json_pointer: Some("/row".into()),
            input: vec![path.to_string_lossy().to_string()],
        };
        let documents = settings.load().unwrap();
        assert_eq!(documents.len(), 3);
        assert!(documents[0].label.ends_with("rows.ndjson:1"));
        assert!(documents[1].label.ends_with("rows.ndjson:3"));
        assert_eq!(documents[2].value, None);

        let ty = object([("id", number())]);
        assert_eq!(check(&ty, &documents, true), Tally { passed: 1, failed: 2 });
    }

    #[test]
    fn loads_schema_documents() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", r#"{"type": "List", "itemType": "number"}"#);
        let ty = load_descriptor(&good, &Registry::default()).unwrap();
        assert_eq!(ty.validate(&json!(["1"])), Ok(json!([1])));

        let bad = write(dir.path(), "bad.json", r#"{"type": "List", "itemType": "integer"}"#);
        let err = load_descriptor(&bad, &Registry::default()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid schema document"));
    }

    #[test]
    fn route_with_and_without_params() {
        let matcher = RoutePattern::compile("/items/:id", RouteOptions::default()).unwrap();
        assert_eq!(route(&matcher, None, "/items/7"), Some(Ok(json!({"id": "7"}))));
        assert_eq!(route(&matcher, None, "/nope"), None);

        let typed = pattern_with(matcher.clone(), object([("id", number())]));
        assert_eq!(route(&matcher, Some(&typed), "/items/7"), Some(Ok(json!({"id": 7}))));
        assert!(matches!(route(&matcher, Some(&typed), "/items/x"), Some(Err(_))));
    }
}
