use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing_subscriber::EnvFilter;

use flink_cluster_crd::config::ClusterConfig;
use flink_cluster_crd::crd::merged_crd;
use flink_cluster_crd::drift::Drift;
use flink_cluster_crd::manifest::{self, Format, Manifest, SchemaVersion};

#[derive(Clone, Debug, Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Subcommand,

    /// Output format
    #[clap(short, long, value_enum, default_value = "yaml", env = "FLINK_CLUSTER_OUTPUT")]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(output: OutputFormat) -> Self {
        match output {
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

#[derive(Clone, Debug, Parser)]
enum Subcommand {
    /// Print the diagnostic rendering of a manifest's spec
    Show(FileOpts),
    /// Rewrite a manifest with another schema version's layout
    Migrate(MigrateOpts),
    /// Compare an observed and a desired manifest
    Diff(DiffOpts),
    /// Print the effective configuration with defaults applied
    Resolve(ResolveOpts),
    /// Print the CustomResourceDefinition serving every version
    Crd,
}

#[derive(Clone, Debug, Parser)]
struct FileOpts {
    /// Manifest file (YAML or JSON), either a whole resource or its spec
    file: PathBuf,
}

#[derive(Clone, Debug, Parser)]
struct MigrateOpts {
    file: PathBuf,

    /// Target schema version
    #[clap(long, default_value = "v1alpha2")]
    to: SchemaVersion,
}

#[derive(Clone, Debug, Parser)]
struct DiffOpts {
    observed: PathBuf,
    desired: PathBuf,
}

#[derive(Clone, Debug, Parser)]
struct ResolveOpts {
    file: PathBuf,

    /// Name used when the manifest has no metadata
    #[clap(long)]
    name: Option<String>,

    #[clap(short, long, default_value = "default")]
    namespace: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts: Opts = Opts::parse();
    let format = Format::from(opts.output);

    match opts.command {
        Subcommand::Show(c) => {
            let text = fs::read_to_string(&c.file)
                .with_context(|| format!("reading {}", c.file.display()))?;
            let document = manifest::parse_document(&text)?;
            println!("{}", manifest::describe(document)?);
        }
        Subcommand::Migrate(c) => {
            let manifest = read(&c.file)?;
            let document = manifest.to_value(c.to)?;
            print!("{}", manifest::render(&document, format)?);
        }
        Subcommand::Diff(c) => {
            let observed = read(&c.observed)?.into_spec();
            let desired = read(&c.desired)?.into_spec();
            match Drift::between(&observed, &desired)? {
                Some(drift) => println!("{drift}"),
                None => println!("no drift"),
            }
        }
        Subcommand::Resolve(c) => {
            let manifest = read(&c.file)?;
            let metadata = match manifest.metadata() {
                Some(metadata) => ObjectMeta {
                    namespace: metadata.namespace.clone().or(Some(c.namespace)),
                    ..metadata.clone()
                },
                None => ObjectMeta {
                    name: c.name,
                    namespace: Some(c.namespace),
                    ..ObjectMeta::default()
                },
            };
            let config = ClusterConfig::resolve(&metadata, manifest.spec())?;
            let document = serde_json::to_value(&config)?;
            print!("{}", manifest::render(&document, format)?);
        }
        Subcommand::Crd => {
            let document = serde_json::to_value(merged_crd()?)?;
            print!("{}", manifest::render(&document, format)?);
        }
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<Manifest> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    manifest::read_manifest(&text).with_context(|| format!("parsing {}", path.display()))
}
