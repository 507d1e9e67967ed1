//! CLI command definitions and handlers

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;

use crate::core::config::{AppConfig, Provider};
use crate::core::models::BibEntry;
use crate::processors::{bibtex, enrich, render};
use crate::translators::{self, IdentityTranslator, Translator};

/// Output format for `convert`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-indented outline
    Outline,
    /// Enriched entries as JSON
    Json,
}

/// Commands for the BibTeX metadata tool
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert BibTeX entries into outline metadata
    Convert {
        /// Input `.bib` file or directory (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation provider (overrides config)
        #[arg(short, long)]
        provider: Option<Provider>,

        /// Recurse into subdirectories when input is a directory
        #[arg(short, long)]
        recursive: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Outline)]
        format: OutputFormat,

        /// Test mode: no network translation, echo the input first
        #[arg(long)]
        test: bool,
    },

    /// List translation providers and their credential status
    Providers,
}

/// Options for [`handle_convert`]
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Input file or directory, stdin when `None`
    pub input: Option<PathBuf>,
    /// Output file, stdout when `None`
    pub output: Option<PathBuf>,
    /// Provider override
    pub provider: Option<Provider>,
    /// Recurse into subdirectories
    pub recursive: bool,
    /// Output format
    pub format: OutputFormat,
    /// Skip translation and echo the input
    pub test: bool,
    /// Hide the progress bar
    pub quiet: bool,
}

/// Read every input entry, in order
async fn read_entries(input: Option<&PathBuf>, recursive: bool) -> anyhow::Result<(String, Vec<BibEntry>)> {
    match input {
        Some(path) if path.is_dir() => {
            let files = bibtex::find_bib_files(path, recursive)?;
            if files.is_empty() {
                anyhow::bail!("No .bib files found in {}", path.display());
            }

            let mut raw = String::new();
            let mut entries = Vec::new();
            for file in files {
                info!("Reading: {}", file.display());
                let content = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                entries.extend(
                    bibtex::parse(&content)
                        .with_context(|| format!("Failed to parse {}", file.display()))?,
                );
                raw.push_str(&content);
            }
            Ok((raw, entries))
        }
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let entries = bibtex::parse(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok((content, entries))
        }
        None => read_stream(tokio::io::stdin()).await,
    }
}

/// Read and parse BibTeX from a stream such as stdin
async fn read_stream<R: AsyncRead + Unpin>(mut reader: R) -> anyhow::Result<(String, Vec<BibEntry>)> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .await
        .context("Failed to read stdin")?;
    let entries = bibtex::parse(&content).context("Failed to parse stdin")?;
    Ok((content, entries))
}

/// Handle the convert command
pub async fn handle_convert(config: AppConfig, options: ConvertOptions) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let mut config = config;

    if let Some(provider) = options.provider {
        config.translator.provider = provider;
    }

    let translator: Box<dyn Translator> = if options.test {
        info!("Test mode: translation disabled");
        Box::new(IdentityTranslator)
    } else {
        translators::build_translator(&config).context("Failed to create translator")?
    };

    let (raw, mut entries) = read_entries(options.input.as_ref(), options.recursive).await?;

    if options.test {
        println!("{}", raw);
    }

    let pb = if options.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(entries.len() as u64);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"));
        pb
    };

    let stats = enrich::enrich_all(
        &mut entries,
        translator.as_ref(),
        config.translator.on_failure,
        Some(&pb),
    )
    .await;
    pb.finish_and_clear();

    let rendered = match options.format {
        OutputFormat::Outline => render::render_lenient(&entries),
        OutputFormat::Json => serde_json::to_string_pretty(&entries)?,
    };

    match &options.output {
        Some(path) => {
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Written: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    info!(
        "Completed: {} entries ({} enriched, {} skipped) in {:?}",
        entries.len(),
        stats.enriched + stats.fallback,
        stats.skipped,
        start_time.elapsed()
    );

    Ok(())
}

/// Handle the providers command
pub fn handle_providers(config: &AppConfig) -> anyhow::Result<()> {
    for provider in Provider::ALL {
        let marker = if provider == config.translator.provider { "*" } else { " " };
        let credentials = config.credentials_for(provider);

        if credentials.is_empty() {
            println!("{} {:<8} no credentials required", marker, provider);
            continue;
        }

        let status: Vec<String> = credentials
            .iter()
            .map(|(name, present)| format!("{} [{}]", name, if *present { "set" } else { "missing" }))
            .collect();
        println!("{} {:<8} {}", marker, provider, status.join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
@article{lee2021,
  title = {Short Paper},
  author = {Lee, K. and Park, S.},
  abstractNote = {We study things.
Results are good.}
}
"#;

    fn options(input: PathBuf, output: PathBuf, format: OutputFormat) -> ConvertOptions {
        ConvertOptions {
            input: Some(input),
            output: Some(output),
            provider: Some(Provider::None),
            recursive: false,
            format,
            test: false,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_convert_file_to_outline() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("refs.bib");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, SAMPLE).unwrap();

        handle_convert(AppConfig::default(), options(input, output.clone(), OutputFormat::Outline))
            .await
            .unwrap();

        let rendered = std::fs::read_to_string(&output).unwrap();
        assert!(rendered.starts_with("metadata\n\tlee2021\n\t\tShort Paper\n"));
        assert!(rendered.contains("\t\tabstractnote_cn: We study things."));
        assert!(!rendered.contains("things.\n"));
        assert!(rendered.contains("\t\tauthor: [[Lee, K.]],[[Park, S.]]"));
    }

    #[tokio::test]
    async fn test_convert_directory_to_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bib"), SAMPLE).unwrap();
        std::fs::write(
            dir.path().join("b.bib"),
            "@misc{other, title = {Other}}",
        )
        .unwrap();
        let output = dir.path().join("out.json");

        handle_convert(
            AppConfig::default(),
            options(dir.path().to_path_buf(), output.clone(), OutputFormat::Json),
        )
        .await
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["ID"], "lee2021");
        assert_eq!(entries[0]["author"], serde_json::json!(["Lee, K.", "Park, S."]));
        assert_eq!(entries[1]["ID"], "other");
    }

    #[tokio::test]
    async fn test_convert_missing_credentials_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("refs.bib");
        std::fs::write(&input, SAMPLE).unwrap();

        let mut opts = options(input, dir.path().join("out.txt"), OutputFormat::Outline);
        opts.provider = Some(Provider::Baidu);

        assert!(handle_convert(AppConfig::default(), opts).await.is_err());
        assert!(!dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_read_stream_parses_entries() {
        let (raw, entries) = read_stream(SAMPLE.as_bytes()).await.unwrap();
        assert_eq!(raw, SAMPLE);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), Some("lee2021"));

        assert!(read_stream("@article{bad, title = {".as_bytes()).await.is_err());
    }

    #[test]
    fn test_providers_listing() {
        assert!(handle_providers(&AppConfig::default()).is_ok());
    }
}
