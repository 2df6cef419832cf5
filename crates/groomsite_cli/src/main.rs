/* 📖 # How the groomsite binary is organised
Each subcommand is one step of the pipeline and reads or writes files in the
current directory, so the steps can be run independently:

1. `scrape` or `synthesize` writes the business data file
2. `enrich` adds contact details to that file
3. `generate` renders the static site into the output directory
4. `serve` serves the output directory and logs changed files

Configuration comes from `groomsite.toml` (or `--config`); a missing file means
defaults. Any error is printed and the process exits with status 1.
*/

use std::env;
use std::process;

use clap::{Parser, Subcommand};
use tracing::info;

use groomsite_base::tracing::init_tracing;
use groomsite_base::{FilePath, GroomsiteResult, PalHandle, RealPal};
use groomsite_engine::source::BusinessSource;
use groomsite_engine::{
    PlacesSource, RenderContext, SiteConfig, SiteGenerator, SyntheticSource, collect_directory_with,
    ensure_cities_file, load_cities, load_config, load_directory, save_directory, start_dev_server,
};

#[derive(Parser)]
#[command(version, about = "Mobile pet grooming directory site generator")]
struct Cli {
    /// Configuration file, relative to the current directory.
    #[arg(short, long, default_value = "groomsite.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect businesses for every city from the Places API.
    Scrape,
    /// Fabricate plausible business data for every city.
    Synthesize,
    /// Add phone, website and maps links to records that have a place id.
    Enrich,
    /// Render the static site from the business data file.
    Generate,
    /// Serve the generated site and watch it for changes until interrupted.
    Serve,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });
    let pal = PalHandle::new(RealPal::new(current_dir));

    if let Err(e) = run(&pal, &cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(pal: &PalHandle, cli: &Cli) -> GroomsiteResult<()> {
    let config = load_config(pal, &FilePath::from(cli.config.as_str()))?;
    match cli.command {
        Command::Scrape => {
            let mut source = PlacesSource::from_config(&config.places)?;
            collect(pal, &config, &mut source)
        }
        Command::Synthesize => {
            let mut source = SyntheticSource::from_seed(config.seed);
            collect(pal, &config, &mut source)
        }
        Command::Enrich => enrich(pal, &config),
        Command::Generate => generate(pal, &config),
        Command::Serve => serve(pal, &config),
    }
}

fn collect(pal: &PalHandle, config: &SiteConfig, source: &mut dyn BusinessSource) -> GroomsiteResult<()> {
    let cities_path = config.cities_path();
    ensure_cities_file(pal, &cities_path)?;
    let cities = load_cities(pal, &cities_path)?;
    let data_path = config.business_data_path();

    println!("Collecting {} businesses for {} cities", source.name(), cities.len());
    let directory = collect_directory_with(source, &cities, |city, directory| {
        let count = directory.for_city(city).map_or(0, <[_]>::len);
        println!("  {}: {} businesses", city.location_key(), count);
        save_directory(pal, &data_path, directory)
    })?;

    println!(
        "Saved {} businesses across {} cities to {}",
        directory.business_count(),
        directory.location_count(),
        data_path
    );
    Ok(())
}

fn enrich(pal: &PalHandle, config: &SiteConfig) -> GroomsiteResult<()> {
    let data_path = config.business_data_path();
    let mut directory = load_directory(pal, &data_path);
    if directory.is_empty() {
        println!("No business data to enrich in {}", data_path);
        return Ok(());
    }
    let source = PlacesSource::from_config(&config.places)?;
    let updated = source.enrich_contacts(&mut directory);
    save_directory(pal, &data_path, &directory)?;
    println!("Updated contact details for {} businesses", updated);
    Ok(())
}

fn generate(pal: &PalHandle, config: &SiteConfig) -> GroomsiteResult<()> {
    let cities_path = config.cities_path();
    ensure_cities_file(pal, &cities_path)?;
    let cities = load_cities(pal, &cities_path)?;
    let directory = load_directory(pal, &config.business_data_path());

    let context = RenderContext::from_config(config, chrono::Local::now().date_naive());
    let report = SiteGenerator::new(pal.clone(), config, context).generate(&cities, &directory)?;

    println!("Generated {} city pages in {}", report.page_count(), config.output_dir);
    for city in &report.skipped {
        println!("  skipped {} (no business data)", city.location_key());
    }
    Ok(())
}

fn serve(pal: &PalHandle, config: &SiteConfig) -> GroomsiteResult<()> {
    let server = start_dev_server(pal, config)?;
    println!("Serving {} at http://localhost:{}", config.server.root, server.port());
    println!("Press Ctrl+C to stop");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| groomsite_base::err!("Failed to start signal runtime: {}", e))?;
    let interrupted = runtime.block_on(tokio::signal::ctrl_c());

    server.stop();
    interrupted.map_err(|e| groomsite_base::err!("Failed to wait for Ctrl+C: {}", e))?;
    info!("interrupted, exiting");
    Ok(())
}
