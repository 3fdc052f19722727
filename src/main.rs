use sd_gallery::api::thumbnail::{self, ThumbnailCache};
use sd_gallery::api::GalleryClient;
use sd_gallery::app::{App, Flags};
use sd_gallery::config::{self, CliArgs, Config, Settings};
use sd_gallery::error::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let flags = match startup() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            println!("{}", config::USAGE);
            return Ok(());
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", config::USAGE);
            std::process::exit(2);
        }
    };

    iced::application("SD Gallery", App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .centered()
        .run_with(move || App::new(flags))
}

/// Resolve settings and build the backend client; `None` when help was requested
fn startup() -> Result<Option<Flags>> {
    let cli = CliArgs::from_env()?;
    if cli.help {
        return Ok(None);
    }

    // A broken config file is not fatal; fall back to defaults
    let file_config = config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        Config::default()
    });
    let settings = Settings::resolve(file_config, cli);

    let client = GalleryClient::new(&settings.server_url, settings.request_timeout)?;

    let thumbnail_cache = if settings.thumbnail_cache {
        thumbnail::default_cache_dir().map(ThumbnailCache::new)
    } else {
        None
    };
    if let Some(cache) = &thumbnail_cache {
        info!("📁 Thumbnail cache at: {}", cache.dir().display());
        if let Err(e) = cache.prune(thumbnail::MAX_CACHED_THUMBNAILS) {
            warn!("Failed to prune thumbnail cache: {}", e);
        }
    }

    Ok(Some(Flags {
        client,
        thumbnail_cache,
        thumb_size: settings.thumb_size,
    }))
}
