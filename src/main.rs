use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chartsync::{
    catalog,
    chartrepo::{self, parse_chart_name},
    filter::{Decoration, Filter},
    http::ChartContent,
    model::{Credential, Registry, Resource},
};
use clap::{Parser, Subcommand};

/// Synchronize charts with a chart repository or a chart catalog.
#[derive(Parser)]
#[clap(version)]
struct Args {
    /// Base URL of the chart repository (required unless using `catalog`)
    #[clap(long)]
    url: Option<String>,

    /// Skip TLS certificate verification
    #[clap(long)]
    insecure: bool,

    /// User to authenticate as
    #[clap(long)]
    username: Option<String>,

    /// Path to a file containing the password.
    /// You can also pass the password verbatim via the CHARTSYNC_PASSWORD env variable.
    #[clap(long, requires = "username")]
    password_file: Option<String>,

    /// Base URL of the chart catalog (defaults to the public catalog)
    #[clap(long)]
    catalog_url: Option<String>,

    /// Make logging more verbose.
    /// You can also specify the log level via the RUST_LOG env variable.
    #[clap(long, short)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List chart versions matching the filters
    List(FilterArgs),
    /// Check whether a chart version exists
    Exist(ChartArgs),
    /// Download a chart version
    Download {
        #[clap(flatten)]
        chart: ChartArgs,
        /// Output file, defaults to <chart>-<version>.tgz
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload a packaged chart
    Upload {
        #[clap(flatten)]
        chart: ChartArgs,
        /// Chart archive to upload
        file: PathBuf,
    },
    /// Delete a chart version
    Delete(ChartArgs),
    /// Query the chart catalog
    #[clap(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List chart versions in the catalog matching the filters
    List(FilterArgs),
    /// Check whether a chart version exists in the catalog
    Exist(ChartArgs),
    /// Download a chart version from the catalog
    Download {
        #[clap(flatten)]
        chart: ChartArgs,
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Check that the catalog is reachable
    Health,
}

#[derive(clap::Args)]
struct ChartArgs {
    /// Chart name as <project>/<chart>
    name: String,
    version: String,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Repository name pattern, e.g. library/** (repeatable)
    #[clap(long = "name")]
    names: Vec<String>,

    /// Only versions matching this pattern
    #[clap(long)]
    tag: Option<String>,

    /// Skip versions matching this pattern
    #[clap(long)]
    exclude_tag: Option<String>,

    /// Only versions carrying this label (repeatable)
    #[clap(long = "label")]
    labels: Vec<String>,
}

impl FilterArgs {
    fn filters(&self) -> Vec<Filter> {
        let mut filters: Vec<Filter> = self.names.iter().map(Filter::name).collect();
        if let Some(pattern) = &self.tag {
            filters.push(Filter::tag(pattern));
        }
        if let Some(pattern) = &self.exclude_tag {
            filters.push(Filter::Tag {
                pattern: pattern.clone(),
                decoration: Decoration::Excludes,
            });
        }
        if !self.labels.is_empty() {
            filters.push(Filter::label(self.labels.clone()));
        }
        filters
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if env::var("RUST_LOG").is_err() {
        let level = match args.verbose {
            true => "debug",
            false => "info",
        };
        env::set_var("RUST_LOG", format!("{}={}", env!("CARGO_PKG_NAME"), level));
    }
    env_logger::init();

    log::info!(
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );
    log::debug!("With arguments {:?}", env::args().collect::<Vec<_>>());

    if let Err(error) = run(args).await {
        log::error!("{:?}", error);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::Catalog(command) = args.command {
        return run_catalog(args.catalog_url.as_deref(), args.insecure, command).await;
    }

    let url = args
        .url
        .as_deref()
        .ok_or_else(|| anyhow!("--url is required for chart repository commands"))?;
    let credential = match args.username {
        Some(username) => Some(Credential {
            username,
            password: read_password(args.password_file.as_deref()).await?,
        }),
        None => None,
    };
    let registry = Registry::new("chartrepo", url)
        .with_insecure(args.insecure)
        .with_credential(credential);
    let adapter = chartrepo::connect(registry).context("Failed to create chart repository client")?;

    match args.command {
        Command::List(filter_args) => {
            let resources = adapter
                .fetch_charts(&filter_args.filters())
                .await
                .context("Failed to list charts")?;
            print_resources(&resources);
        }
        Command::Exist(chart) => {
            let exists = adapter
                .chart_exist(&chart.name, &chart.version)
                .await
                .context(format!("Failed to look up {}:{}", chart.name, chart.version))?;
            println!("{}", exists);
        }
        Command::Download { chart, output } => {
            let content = adapter
                .download_chart(&chart.name, &chart.version, "")
                .await
                .context(format!("Failed to download {}:{}", chart.name, chart.version))?;
            save_chart(&chart, output, content).await?;
        }
        Command::Upload { chart, file } => {
            let content = tokio::fs::File::open(&file)
                .await
                .context(format!("Failed to open {}", file.display()))?;
            adapter
                .upload_chart(&chart.name, &chart.version, Box::new(content))
                .await
                .context(format!("Failed to upload {}:{}", chart.name, chart.version))?;
        }
        Command::Delete(chart) => {
            adapter
                .delete_chart(&chart.name, &chart.version)
                .await
                .context(format!("Failed to delete {}:{}", chart.name, chart.version))?;
        }
        Command::Catalog(_) => unreachable!("handled above"),
    }

    Ok(())
}

async fn run_catalog(
    catalog_url: Option<&str>,
    insecure: bool,
    command: CatalogCommand,
) -> Result<()> {
    let adapter =
        catalog::connect(catalog_url, insecure).context("Failed to create catalog client")?;

    match command {
        CatalogCommand::List(filter_args) => {
            let resources = adapter
                .fetch_charts(&filter_args.filters())
                .await
                .context("Failed to list catalog charts")?;
            print_resources(&resources);
        }
        CatalogCommand::Exist(chart) => {
            let exists = adapter
                .chart_exist(&chart.name, &chart.version)
                .await
                .context(format!("Failed to look up {}:{}", chart.name, chart.version))?;
            println!("{}", exists);
        }
        CatalogCommand::Download { chart, output } => {
            let content = adapter
                .download_chart(&chart.name, &chart.version)
                .await
                .context(format!("Failed to download {}:{}", chart.name, chart.version))?;
            save_chart(&chart, output, content).await?;
        }
        CatalogCommand::Health => {
            adapter
                .catalog()
                .check_healthy()
                .await
                .context(format!("Catalog {} is not healthy", adapter.catalog().base_url()))?;
            log::info!("Catalog {} is healthy", adapter.catalog().base_url());
        }
    }

    Ok(())
}

async fn read_password(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read the password from {}", path))?
            .trim()
            .to_string()),
        None => env::var("CHARTSYNC_PASSWORD")
            .context("No password provided via --password-file or CHARTSYNC_PASSWORD"),
    }
}

async fn save_chart(
    chart: &ChartArgs,
    output: Option<PathBuf>,
    mut content: ChartContent,
) -> Result<()> {
    let output = match output {
        Some(output) => output,
        None => {
            let (_, name) = parse_chart_name(&chart.name)?;
            PathBuf::from(format!("{}-{}.tgz", name, chart.version))
        }
    };

    let mut file = tokio::fs::File::create(&output)
        .await
        .context(format!("Failed to create {}", output.display()))?;
    let written = tokio::io::copy(&mut content, &mut file)
        .await
        .context(format!("Failed to write {}", output.display()))?;
    log::info!("Saved {} bytes to {}", written, output.display());
    Ok(())
}

fn print_resources(resources: &[Resource]) {
    for resource in resources {
        let labels = &resource.metadata.artifact.labels;
        match labels.is_empty() {
            true => println!("{}", resource),
            false => println!("{} [{}]", resource, labels.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_from_args() {
        let args = Args::parse_from([
            "chartsync",
            "--url",
            "https://harbor.local",
            "list",
            "--name",
            "library/**",
            "--exclude-tag",
            "*-rc*",
            "--label",
            "stable",
        ]);
        let filter_args = match args.command {
            Command::List(filter_args) => filter_args,
            _ => panic!("expected the list command"),
        };

        assert_eq!(
            filter_args.filters(),
            vec![
                Filter::name("library/**"),
                Filter::Tag {
                    pattern: "*-rc*".to_string(),
                    decoration: Decoration::Excludes,
                },
                Filter::label(vec!["stable".to_string()]),
            ]
        );
    }

    #[test]
    fn test_catalog_args() {
        let args = Args::parse_from([
            "chartsync",
            "--catalog-url",
            "https://catalog.local",
            "catalog",
            "exist",
            "stable/nginx",
            "1.0.0",
        ]);
        assert_eq!(args.catalog_url.as_deref(), Some("https://catalog.local"));
        match args.command {
            Command::Catalog(CatalogCommand::Exist(chart)) => {
                assert_eq!(chart.name, "stable/nginx");
                assert_eq!(chart.version, "1.0.0");
            }
            _ => panic!("expected the catalog exist command"),
        }
    }
}
