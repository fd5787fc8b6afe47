use chantbook::config::{self, AppConfig};
use chantbook::context::Session;
use chantbook::layout;
use chantbook::post::{self, AssemblyContext, AssemblySettings};
use chantbook::songbook::{CoverReveal, CoverState, CurrentSong, Navigator};
use chantbook::{input, output, telemetry, toc};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

const COVER_POLL_INTERVAL: Duration = Duration::from_millis(50);

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "chantbook")]
#[command(about = "Assemble supporter-club feed posts and songbooks")]
#[command(long_about = "\
Assemble supporter-club feed posts and songbooks

Feed posts are parsed for *bold*, _italic_, links and emails, their images
laid out, and their attachments resolved against the data bundle. Songbooks
get a page-numbered table of contents.

Inputs are JSON:

  data.json         {channels, permissions, players, songs, rosters, session}
  posts/*.json      one post per file, any depth
  songbook.json     {chapters, songs}

Run 'chantbook gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Data bundle with channels, permissions, collections and session
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Directory holding config.toml and config.<env>.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Config environment overlay
    #[arg(long, default_value = "development", global = true)]
    env: String,

    /// Session state file; overrides the bundle's session and is saved back
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct ViewArgs {
    /// Window width the layout is planned for
    #[arg(long, default_value_t = 390.0)]
    window_width: f64,

    /// Reference time for published labels (RFC 3339), default now
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a single post file
    Post {
        file: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Assemble every post under a directory, newest first
    Feed {
        dir: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show a songbook's table of contents, revealing the cover first if unseen
    Toc {
        songbook: PathBuf,
        /// Cover image size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        cover_size: Option<(u32, u32)>,
        #[arg(long, default_value_t = 390.0)]
        window_width: f64,
    },
    /// Open one song from a songbook
    Song { songbook: PathBuf, id: String },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config_dir, Some(&cli.env))?;
    telemetry::init(&config.logging)?;
    info!(env = %cli.env, version = version_string(), "starting");

    let mut bundle = input::load_bundle(cli.data.as_deref())?;
    if let Some(state) = &cli.state
        && let Some(session) = input::load_session(state)?
    {
        bundle.session = session;
    }

    match &cli.command {
        Command::Post { file, view } => {
            let record = input::load_post(file)?;
            let posts = assemble(&bundle, &config, view, std::slice::from_ref(&record));
            emit(cli.json, &posts, || output::print_feed(&posts))?;
        }
        Command::Feed { dir, view } => {
            let records = input::load_posts(dir)?;
            info!(posts = records.len(), "assembling feed");
            let posts = assemble(&bundle, &config, view, &records);
            emit(cli.json, &posts, || output::print_feed(&posts))?;
        }
        Command::Toc {
            songbook,
            cover_size,
            window_width,
        } => {
            let songbook = input::load_songbook(songbook)?;
            let songs = songbook.index();

            if let Some(size) = cover_size
                && let Some((w, h)) = layout::cover_geometry(*size, *window_width)
                && !cli.json
            {
                println!("Cover {w:.0}x{h:.0}");
            }
            reveal_cover(&mut bundle.session, &config);
            save_state(cli.state.as_deref(), &bundle.session)?;

            let contents = toc::build(&songbook.chapters, &songs);
            emit(cli.json, &contents, || {
                output::print_toc(&contents, &songs, &config.songbook.capo_prefix)
            })?;
        }
        Command::Song { songbook, id } => {
            let songbook = input::load_songbook(songbook)?;
            let songs = songbook.index();
            let contents = toc::build(&songbook.chapters, &songs);

            let mut navigator = Navigator::new();
            let song = songs.lookup(id)?.clone();
            let page = contents.page_of(id);
            navigator.set_current(
                CurrentSong { song, page },
                |current| info!(song_id = %current.song.id, page = ?current.page, "song opened"),
            );
            if let Some(current) = navigator.current() {
                emit(cli.json, current, || {
                    output::print_song(current, &config.songbook.capo_prefix)
                })?;
            }
        }
        // Printed before config load.
        Command::GenConfig => {}
    }

    Ok(())
}

fn assemble(
    bundle: &input::DataBundle,
    config: &AppConfig,
    view: &ViewArgs,
    records: &[chantbook::types::PostRecord],
) -> Vec<post::PostContent> {
    let settings = AssemblySettings::from_config(config, view.window_width);
    let ctx = AssemblyContext {
        collections: &bundle.collections,
        directory: bundle,
        permissions: bundle,
        session: &bundle.session,
        settings: &settings,
        now: view.now.unwrap_or_else(Utc::now),
    };
    post::assemble_feed(records, &ctx)
}

/// Hold the cover until its delay elapses, polling like a host event loop.
fn reveal_cover(session: &mut Session, config: &AppConfig) {
    let mut reveal = CoverReveal::mount(&*session, config.songbook.cover_delay(), Instant::now());
    if reveal.state() == CoverState::ShowingCover {
        info!(delay_ms = config.songbook.cover_delay_ms, "waiting for cover reveal");
    }
    while reveal.state() == CoverState::ShowingCover {
        std::thread::sleep(COVER_POLL_INTERVAL);
        reveal.tick(session, Instant::now());
    }
    reveal.teardown();
}

fn save_state(path: Option<&Path>, session: &Session) -> Result<(), input::InputError> {
    match path {
        Some(path) => input::save_session(path, session),
        None => Ok(()),
    }
}

fn emit<T: serde::Serialize>(
    json: bool,
    value: &T,
    print_text: impl FnOnce(),
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print_text();
    }
    Ok(())
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}
