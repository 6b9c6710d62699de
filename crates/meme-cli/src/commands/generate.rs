//! Generate command - caption an image with a quote.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args};
use console::style;
use futures_util::StreamExt;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use meme_core::{
    extension_of, MemeEngine, QuoteIngestor, QuoteModel, RenderRequest,
    SUPPORTED_IMAGE_EXTENSIONS,
};

use super::config::load_config;

/// Arguments for the generate command.
#[derive(Args)]
#[command(group(
    ArgGroup::new("image_source")
        .required(true)
        .args(["image", "image_url", "images"]),
))]
#[command(group(
    ArgGroup::new("quote_source")
        .required(true)
        .args(["body", "quotes"]),
))]
pub struct GenerateArgs {
    /// Image to caption
    #[arg(long)]
    image: Option<PathBuf>,

    /// Download the image to caption from this URL
    #[arg(long)]
    image_url: Option<String>,

    /// Pick a random gif/jpg/jpeg/png image from this directory
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Quote body
    #[arg(long, requires = "author")]
    body: Option<String>,

    /// Quote author
    #[arg(long, requires = "body")]
    author: Option<String>,

    /// Pick a random quote from these files
    #[arg(short, long, num_args = 1..)]
    quotes: Vec<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum output width in pixels (overrides config)
    #[arg(long)]
    max_width: Option<u32>,
}

pub async fn run(args: GenerateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(output_dir) = &args.output_dir {
        config.render.output_dir = output_dir.clone();
    }
    if let Some(max_width) = args.max_width {
        config.render.max_width = max_width;
    }
    config.validate()?;

    let engine = MemeEngine::from_config(&config.render)?;

    let quote = match (&args.body, &args.author) {
        (Some(body), Some(author)) => QuoteModel::new(body.as_str(), author.as_str()),
        _ => {
            let ingestor = QuoteIngestor::from_config(&config.ingest);
            let quotes = ingestor.parse_all(&args.quotes)?;
            pick_random(quotes).ok_or_else(|| anyhow::anyhow!("No quotes found in input files"))?
        }
    };
    debug!("Using quote {}", quote);

    // The download dir is removed when dropped, after rendering.
    let (image_path, _download_dir) = if let Some(image) = &args.image {
        (image.clone(), None)
    } else if let Some(dir) = &args.images {
        let images = list_images(dir)?;
        let image = pick_random(images)
            .ok_or_else(|| anyhow::anyhow!("No images found in {}", dir.display()))?;
        (image, None)
    } else if let Some(url) = &args.image_url {
        let file_name = file_name_from_url(url)?;
        let dir = tempfile::Builder::new().prefix("meme-download-").tempdir()?;
        let path = dir.path().join(file_name);
        download_image(url, &path).await?;
        (path, Some(dir))
    } else {
        anyhow::bail!("One of --image, --image-url or --images is required");
    };
    info!("Captioning {}", image_path.display());

    let request = RenderRequest::new(&image_path, quote.body(), quote.author());
    let result = engine.render(&request)?;

    println!(
        "{} Created {} ({}x{})",
        style("✓").green(),
        result.output_path.display(),
        result.width,
        result.height
    );

    Ok(())
}

fn pick_random<T>(mut items: Vec<T>) -> Option<T> {
    items.shuffle(&mut rand::thread_rng());
    items.pop()
}

fn list_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));
    debug!("Searching images with {}", pattern);

    let images = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|p| p.is_file())
        .filter(|p| SUPPORTED_IMAGE_EXTENSIONS.contains(&extension_of(p).as_str()))
        .collect();

    Ok(images)
}

/// Last path segment of an image URL, ignoring query and fragment.
fn file_name_from_url(url: &str) -> anyhow::Result<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let name = without_query
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Cannot derive a file name from {}", url))?;

    let ext = extension_of(Path::new(name));
    if !SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        anyhow::bail!("{} is not a supported image (expected gif, jpg, jpeg or png)", url);
    }

    Ok(name.to_string())
}

async fn download_image(url: &str, path: &Path) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {} while downloading {}", response.status(), url);
    }

    let pb = ProgressBar::new(response.content_length().unwrap_or(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {bytes}/{total_bytes}")?
            .progress_chars("=>-"),
    );

    let mut file = File::create(path)?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    pb.finish_and_clear();

    Ok(())
}
