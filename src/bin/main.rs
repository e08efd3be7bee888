//! smosvm command line interface
//!
//! Train, inspect and apply SVM models on CSV data where the last
//! column holds the {-1, +1} label.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use smosvm::{CsvDataset, KernelKind, Model, RandomPair, Result, Svm, SvmParams};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "smosvm")]
#[command(about = "A simplified SMO trainer for binary support vector machines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (CSV, last column is the label)
    #[arg(long)]
    data: PathBuf,

    /// Output model file (JSON)
    #[arg(short, long)]
    output: PathBuf,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "10.0")]
    c: f64,

    /// Optimality tolerance
    #[arg(short, long, default_value = "0.1")]
    tol: f64,

    /// Alpha-retention tolerance for pruning
    #[arg(long, default_value = "1e-6")]
    alpha_tol: f64,

    /// Consecutive stalled sweeps required for convergence
    #[arg(long, default_value = "100")]
    max_passes: usize,

    /// Hard cap on total sweeps
    #[arg(long, default_value = "10000")]
    max_iterations: usize,

    /// Kernel: linear, polynomial or radial
    #[arg(short, long, default_value = "linear")]
    kernel: String,

    /// Kernel parameter (polynomial degree or radial sigma)
    #[arg(long)]
    kernel_param: Option<f64>,

    /// Apply min-max whitening to features
    #[arg(short, long)]
    whitening: bool,

    /// Seed for the pair-selection random source
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file (JSON)
    #[arg(short, long)]
    model: PathBuf,

    /// Data file to predict on (CSV, last column is the label)
    #[arg(long)]
    data: PathBuf,

    /// Print decision margins alongside labels
    #[arg(long)]
    margins: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Trained model file (JSON)
    #[arg(short, long)]
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Train(args) => cmd_train(args),
        Commands::Predict(args) => cmd_predict(args),
        Commands::Info(args) => cmd_info(args),
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn cmd_train(args: TrainArgs) -> Result<()> {
    let dataset = CsvDataset::from_file(&args.data)?;
    info!(
        "loaded {} examples with {} features",
        dataset.len(),
        dataset.dim()
    );

    let kernel = KernelKind::parse(&args.kernel, args.kernel_param)?;
    let params = SvmParams {
        c: args.c,
        tol: args.tol,
        alpha_tol: args.alpha_tol,
        max_passes: args.max_passes,
        max_iterations: args.max_iterations,
        kernel,
        whitening: args.whitening,
        ..SvmParams::default()
    };

    let mut svm = Svm::with_params(params);
    let report = match args.seed {
        Some(seed) => svm.train_with(&dataset.features, &dataset.labels, &mut RandomPair::seeded(seed))?,
        None => svm.train(&dataset.features, &dataset.labels)?,
    };

    let accuracy = svm.evaluate(&dataset.features, &dataset.labels)?;
    println!(
        "Trained in {} sweeps; {} support vectors; training accuracy {:.2}%",
        report.sweeps,
        report.n_support_vectors,
        accuracy * 100.0
    );

    let model = svm.export()?;
    model.save_to_file(&args.output)?;
    println!("Model saved to {}", args.output.display());
    Ok(())
}

fn cmd_predict(args: PredictArgs) -> Result<()> {
    let model = Model::load_from_file(&args.model)?;
    let svm = Svm::load(model);

    let dataset = CsvDataset::from_file(&args.data)?;
    let predictions = svm.predict_batch(&dataset.features)?;

    for (i, pred) in predictions.iter().enumerate() {
        if args.margins {
            println!("{}: {:+.0} (margin {:.6})", i, pred.label, pred.margin);
        } else {
            println!("{}: {:+.0}", i, pred.label);
        }
    }

    // The label column doubles as ground truth when it is well-formed.
    if dataset.labels.iter().all(|&y| y == 1.0 || y == -1.0) {
        let accuracy = svm.evaluate(&dataset.features, &dataset.labels)?;
        println!("Accuracy: {:.2}%", accuracy * 100.0);
    }

    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<()> {
    let model = Model::load_from_file(&args.model)?;
    model.print_summary();
    Ok(())
}
