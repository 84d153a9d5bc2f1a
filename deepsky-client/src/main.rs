//! Command-line front end for querying deep sky catalogs.
//!
//! Catalog files are streams of JSON records. They are loaded in the order given, so later files
//! can replace objects and names of earlier ones.

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deepsky_lib::{
    astro::apparent_magnitude,
    octree::{ObjectHandler, OctreeProcStats},
};
use deepsky_shared::{
    config::CatalogConfig,
    database::{DsoDatabase, DsoDatabaseBuilder},
    dso::DeepSkyObject,
    record::read_json_records,
};
use glam::{DVec3, Quat};
use log::info;

/// How many names are listed per object.
const MAX_NAMES: usize = 3;

/// Query deep sky object catalogs
#[derive(Parser, Debug)]
#[command(name = "deepsky")]
#[command(version, subcommand_precedence_over_arg = true)]
struct Args {
    /// TOML file with catalog settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog files with one JSON record per object
    #[arg(required = true)]
    catalogs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up an object by name or catalog number
    Find {
        /// A name or a catalog number
        query: String,
    },

    /// List names starting with a prefix
    Complete {
        prefix: String,
    },

    /// List objects within a radius around a point
    Close {
        /// Observer position in light years as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        at: DVec3,

        /// Radius in light years
        #[arg(long)]
        radius: f64,
    },

    /// List objects visible from a point
    Visible {
        /// Observer position in light years as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        at: DVec3,

        /// Rotation of the view around the Y axis in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        yaw: f32,

        /// Rotation of the view around the X axis in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pitch: f32,

        /// Vertical field of view in degrees
        #[arg(long, default_value = "45")]
        fov: f32,

        /// Width divided by height of the view
        #[arg(long, default_value = "1.5")]
        aspect: f32,

        /// Faintest apparent magnitude to report
        #[arg(long, default_value = "6")]
        limit: f32,
    },

    /// Print statistics about the loaded catalogs
    Stats,
}

fn parse_vector(value: &str) -> Result<DVec3> {
    let components = value
        .split(',')
        .map(|component| component.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid vector {value:?}"))?;
    match components.as_slice() {
        &[x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => bail!("vector {value:?} should have 3 components"),
    }
}

fn load_database(args: &Args) -> Result<DsoDatabase> {
    let config = match &args.config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    };

    let mut builder = DsoDatabaseBuilder::new(config);
    for catalog in &args.catalogs {
        let file = File::open(catalog)
            .with_context(|| format!("failed to open catalog {}", catalog.display()))?;
        let resource_path = catalog.parent().unwrap_or(catalog.as_path());
        builder
            .load(read_json_records(BufReader::new(file)), resource_path)
            .with_context(|| format!("failed to load catalog {}", catalog.display()))?;
    }

    let database = builder.finish();
    info!("{} deep sky objects in total", database.len());
    Ok(database)
}

/// Collects catalog numbers along with their distance to the observer.
#[derive(Debug, Default)]
struct Hits(Vec<(u32, f64)>);

impl ObjectHandler<DeepSkyObject> for Hits {
    fn process(&mut self, object: &DeepSkyObject, distance: f64) {
        self.0.push((object.catalog_number(), distance));
    }
}

fn print_object(database: &DsoDatabase, dso: &DeepSkyObject) {
    let position = dso.position();
    print!(
        "{:>10} {:<11} ({:.1}, {:.1}, {:.1})",
        dso.catalog_number(),
        dso.dso_type(),
        position.x,
        position.y,
        position.z,
    );
    if dso.has_absolute_magnitude() {
        print!(" M={:.2}", dso.absolute_magnitude());
    }
    println!("  {}", database.name_list(dso, MAX_NAMES));
}

fn print_hits(database: &DsoDatabase, Hits(mut hits): Hits) {
    hits.sort_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs));
    for (catalog_number, distance) in hits {
        let Some(dso) = database.find(catalog_number) else {
            continue;
        };
        print!("{distance:>14.1} ly ");
        if dso.has_absolute_magnitude() {
            print!("m={:>6.2} ", apparent_magnitude(dso.absolute_magnitude(), distance));
        }
        print_object(database, dso);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let database = load_database(&args)?;

    match args.command {
        Command::Find { query } => {
            let dso = match query.parse::<u32>() {
                Ok(catalog_number) => database.find(catalog_number),
                Err(_) => database.find_by_name(&query),
            };
            match dso {
                Some(dso) => print_object(&database, dso),
                None => bail!("no object named {query:?}"),
            }
        }
        Command::Complete { prefix } => {
            for name in database.completion(&prefix) {
                println!("{name}");
            }
        }
        Command::Close { at, radius } => {
            let mut hits = Hits::default();
            database.find_close_objects(&mut hits, at, radius);
            print_hits(&database, hits);
        }
        Command::Visible {
            at,
            yaw,
            pitch,
            fov,
            aspect,
            limit,
        } => {
            // the database expects the rotation from world into camera space
            let camera =
                Quat::from_rotation_y(yaw.to_radians()) * Quat::from_rotation_x(pitch.to_radians());
            let mut hits = Hits::default();
            let mut stats = OctreeProcStats::default();
            database.find_visible_objects(
                &mut hits,
                at,
                camera.inverse(),
                fov.to_radians(),
                aspect,
                limit,
                Some(&mut stats),
            );
            print_hits(&database, hits);
            info!(
                "visited {} nodes up to depth {}, tested {} objects",
                stats.nodes, stats.height, stats.objects
            );
        }
        Command::Stats => {
            let octree = database.octree();
            println!("objects: {}", database.len());
            println!("octree nodes: {}", octree.node_count());
            println!(
                "octree depth: {}",
                octree.nodes().map(|node| node.depth()).max().unwrap_or_default()
            );
            println!(
                "average absolute magnitude: {:.2}",
                database.average_absolute_magnitude()
            );
            if let Some(names) = database.names() {
                println!("names: {}", names.name_count());
            }
        }
    }

    Ok(())
}
