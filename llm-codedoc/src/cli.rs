use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use llm_codedoc_core::assemble::{Documenter, GenerationMode, OUTPUT_FILENAME};
use llm_codedoc_core::config::ProviderKind;
use llm_codedoc_core::contract::SourceLoader;
use llm_codedoc_core::load::{DefaultLoader, SourceInput};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::load_config::{load_config, Overrides};
use crate::provider::ChatCompletionsClient;
use crate::tokenizer::TiktokenCounter;

/// CLI for llm-codedoc: document source code with an LLM.
#[derive(Parser)]
#[clap(
    name = "llm-codedoc",
    version,
    about = "Generate Markdown documentation for source code with an LLM"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Document a file, URL, piped upload or inline text
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Default)]
#[clap(group(ArgGroup::new("input").required(true).args(["source", "text", "stdin"])))]
pub struct GenerateArgs {
    /// Local file path or HTTP(S) URL of the source code
    pub source: Option<String>,

    /// Source code given directly on the command line
    #[clap(long)]
    pub text: Option<String>,

    /// Read the source as an uploaded file from stdin
    #[clap(long)]
    pub stdin: bool,

    /// File name reported for stdin uploads; its extension picks the code fence language
    #[clap(long, default_value = "upload")]
    pub upload_name: String,

    /// Path to the YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Completion provider: openai or groq. When it differs from the config file's provider,
    /// the file's model and base_url are ignored
    #[clap(long)]
    pub provider: Option<ProviderKind>,

    #[clap(long)]
    pub model: Option<String>,

    /// Token count above which the source is documented in chunks
    #[clap(long)]
    pub token_budget: Option<usize>,

    /// Code fence language when it cannot be inferred from the source
    #[clap(long)]
    pub language: Option<String>,

    /// Where to write the Markdown document
    #[clap(long, short, default_value = OUTPUT_FILENAME)]
    pub output: PathBuf,

    /// Do not print the document to stdout
    #[clap(long, short)]
    pub quiet: bool,
}

impl GenerateArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider,
            model: self.model.clone(),
            token_budget: self.token_budget,
            language: self.language.clone(),
        }
    }

    async fn source_input(&self) -> Result<SourceInput> {
        if let Some(text) = &self.text {
            return Ok(SourceInput::Text(text.clone()));
        }
        if self.stdin {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .context("Failed to read source from stdin")?;
            return Ok(SourceInput::Upload {
                filename: self.upload_name.clone(),
                bytes,
            });
        }
        match &self.source {
            Some(location) => Ok(SourceInput::from_location(location)),
            None => anyhow::bail!("Please enter a file URL, path or some code."),
        }
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let settings = load_config(args.config.as_deref(), &args.overrides())?;
    settings.documentation.trace_loaded();

    let input = args.source_input().await?;
    let http = reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .context("Failed to construct HTTP client")?;
    let loader = DefaultLoader::with_client(http);
    let source = match loader.load(input).await {
        Ok(source) => source,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            return Err(anyhow::Error::new(e).context("Failed to load source"));
        }
    };

    let provider = ChatCompletionsClient::from_settings(&settings)
        .context("Failed to construct completion client")?;
    let tokenizer = TiktokenCounter::for_provider(settings.documentation.provider);
    let documenter = Documenter::new(settings.documentation, provider, tokenizer);

    let document = documenter.generate(&source).await;

    tokio::fs::write(&args.output, &document.markdown)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        output = %args.output.display(),
        mode = ?document.mode,
        failed_requests = document.failed_requests,
        "Documentation written"
    );
    if !args.quiet {
        println!("{}", document.markdown);
    }
    if document.mode == GenerationMode::Aborted || document.failed_requests > 0 {
        eprintln!(
            "[WARN] Documentation written to {} with errors embedded",
            args.output.display()
        );
    }
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let result = match cli.command {
        Commands::Generate(args) => generate(args).await,
    };

    let exit_span = tracing::info_span!("exit");
    exit_span.in_scope(|| {
        tracing::info!(success = result.is_ok(), "exit");
    });

    result
}
