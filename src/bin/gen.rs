//! ipdag-gen: CLI tool for compiling region CIDR lists into DAG indexes.

use clap::{Parser, Subcommand};
use ipdag::region::{CompiledRegion, WriteOptions};
use ipdag::{source, BuildConfig, RegionIndex};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ipdag-gen")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Compile IP region lists into compact membership indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile CIDR list files into DAG indexes
    Compile {
        /// Input CIDR lists (plain text or .gz)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Artifact file stem
        #[arg(short, long, default_value = "region")]
        name: String,

        /// Skip the fixed-width prefix lists
        #[arg(long)]
        no_prefix_lists: bool,

        /// Skip the JSON build report
        #[arg(long)]
        no_report: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run a build described by a YAML config
    Build {
        /// Build config file
        #[arg(short, long)]
        config: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Test addresses against compiled indexes
    Lookup {
        /// Directory holding the .btr files
        #[arg(short, long, default_value = "output")]
        index_dir: PathBuf,

        /// Artifact file stem
        #[arg(short, long, default_value = "region")]
        name: String,

        /// Addresses to test
        #[arg(required = true)]
        addresses: Vec<IpAddr>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            output_dir,
            name,
            no_prefix_lists,
            no_report,
            verbose,
        } => compile(
            &input,
            &output_dir,
            &name,
            WriteOptions {
                prefix_lists: !no_prefix_lists,
                report: !no_report,
            },
            verbose,
        ),
        Commands::Build { config, verbose } => build(&config, verbose),
        Commands::Lookup {
            index_dir,
            name,
            addresses,
        } => lookup(&index_dir, &name, &addresses),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn compile(
    inputs: &[PathBuf],
    output_dir: &PathBuf,
    name: &str,
    options: WriteOptions,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let nets = source::load_all(inputs)?;
    if verbose {
        println!("Read {} networks from {} files", nets.len(), inputs.len());
    }

    let region = CompiledRegion::compile(&nets)?;
    let written = region.write(output_dir, name, options)?;
    print_summary(&region, verbose);

    for path in written {
        println!("Generated {:?}", path);
    }
    Ok(())
}

fn build(config_path: &PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if verbose {
        println!("Reading config file: {:?}", config_path);
    }
    let config = BuildConfig::load(config_path)?;
    let region = ipdag::build(&config)?;
    print_summary(&region, verbose);

    println!(
        "Successfully built {:?} -> {:?}",
        config.name, config.output_dir
    );
    Ok(())
}

fn lookup(
    index_dir: &PathBuf,
    name: &str,
    addresses: &[IpAddr],
) -> Result<(), Box<dyn std::error::Error>> {
    let index = RegionIndex::open(index_dir, name)?;
    for ip in addresses {
        println!("{}\t{}", ip, index.contains(*ip));
    }
    Ok(())
}

fn print_summary(region: &CompiledRegion, verbose: bool) {
    if !verbose {
        return;
    }
    for (family, dag) in [("v4", &region.v4), ("v6", &region.v6)] {
        println!(
            "{}: {} ranges, {} => {} nodes, {} bytes",
            family,
            dag.stats.ranges,
            dag.stats.reduce.nodes_before,
            dag.stats.reduce.nodes_after,
            dag.stats.size
        );
    }
}
